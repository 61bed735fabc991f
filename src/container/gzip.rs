//! Single-member gzip framing (RFC 1952).

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// ID1 ID2 CM FLG MTIME XFL OS
pub const HEADER_LEN: usize  = 10;
pub const TRAILER_LEN: usize = 8;
/// Header, an empty final stored block and the trailer.
pub const MIN_MEMBER: usize  = HEADER_LEN + 2 + TRAILER_LEN;

/// Compress `payload` into a complete gzip member with mtime 0 and OS 255.
pub fn member(payload: &[u8], level: Compression) -> io::Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::with_capacity(HEADER_LEN + payload.len() / 2 + TRAILER_LEN), level);
    enc.write_all(payload)?;
    enc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::crc32_parts;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn decodes_with_flate2() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 16) as u8).collect();
        let gz = member(&payload, Compression::default()).unwrap();
        assert_eq!(&gz[..3], &[0x1F, 0x8B, 0x08]);
        let mut back = Vec::new();
        GzDecoder::new(&gz[..]).read_to_end(&mut back).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn header_and_trailer_fields() {
        let payload = b"123456789";
        let gz = member(payload, Compression::default()).unwrap();
        // no flags, zero mtime, unknown OS
        assert_eq!(gz[3], 0);
        assert_eq!(&gz[4..8], &[0; 4]);
        assert_eq!(gz[9], 0xFF);
        let n = gz.len();
        assert_eq!(&gz[n - 8..n - 4], &crc32_parts(&[payload]).to_le_bytes());
        assert_eq!(&gz[n - 4..], &9u32.to_le_bytes());
    }

    #[test]
    fn empty_member_size() {
        let gz = member(&[], Compression::default()).unwrap();
        assert_eq!(gz.len(), MIN_MEMBER);
        assert_eq!(&gz[gz.len() - 8..], &[0; 8]);
    }
}
