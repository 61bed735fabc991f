//! Checksums, variable-length integers and fixed-width field packers shared
//! by the container builders.

pub mod bits;
pub mod vint;

use byteorder::{ByteOrder, LittleEndian};
use crc32fast::Hasher;

// ── CRC-32 ───────────────────────────────────────────────────────────────────

/// Reflected CRC-32 (poly 0xEDB88320) over several slices, e.g. a PNG chunk
/// type then its data.
pub fn crc32_parts(parts: &[&[u8]]) -> u32 {
    let mut hasher = Hasher::new();
    for p in parts {
        hasher.update(p);
    }
    hasher.finalize()
}

const OGG_POLY: u32 = 0x04C1_1DB7;

const fn ogg_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            r = if r & 0x8000_0000 != 0 { (r << 1) ^ OGG_POLY } else { r << 1 };
            bit += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

static OGG_TABLE: [u32; 256] = ogg_table();

/// Ogg page CRC: forward poly 0x04C11DB7, init 0, no reflection, no xorout.
pub fn ogg_crc(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |crc, &b| {
        (crc << 8) ^ OGG_TABLE[(((crc >> 24) as u8) ^ b) as usize]
    })
}

// ── Fixed-width packers ──────────────────────────────────────────────────────

pub fn put_u32_le(buf: &mut [u8], at: usize, v: u32) { LittleEndian::write_u32(&mut buf[at..at + 4], v) }

#[cfg(test)]
pub(crate) fn get_u32_le(buf: &[u8], at: usize) -> u32 { LittleEndian::read_u32(&buf[at..at + 4]) }
#[cfg(test)]
pub(crate) fn get_u32_be(buf: &[u8], at: usize) -> u32 { byteorder::BigEndian::read_u32(&buf[at..at + 4]) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_check_values() {
        assert_eq!(crc32_parts(&[b"1234", b"56789"]), 0xCBF4_3926);
        assert_eq!(ogg_crc(b"123456789"), 0x89A1_897F);
        assert_eq!(ogg_crc(b""), 0);
    }

    #[test]
    fn packers() {
        let mut b = [0u8; 8];
        b[..4].copy_from_slice(&[1, 2, 3, 4]);
        put_u32_le(&mut b, 4, 0x0102_0304);
        assert_eq!(b, [1, 2, 3, 4, 4, 3, 2, 1]);
        assert_eq!(get_u32_be(&b, 0), get_u32_le(&b, 4));
    }
}
