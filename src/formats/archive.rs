//! Archives: ZIP, TAR, GZIP and gzip-compressed TAR.

use ::tar::{Builder, EntryType, Header};
use chrono::Utc;
use flate2::Compression;
use std::io;

use super::EncodeError;
use crate::container::gzip;
use crate::container::package::{self, Part};
use crate::reconcile::{pad_zeros, rescale};

/// Upper bound on the uncompressed source fed to deflate.
const MAX_SOURCE: usize = 8 << 20;
const MEMBER_NAME: &str = "dummy.txt";

/// ustar block size; headers and data are aligned to it.
pub const BLOCK: usize       = 512;
/// Two zero blocks close the archive.
pub const EOF_MARKER: usize  = 2 * BLOCK;
/// Smallest archive with one empty member.
pub const MIN_ARCHIVE: usize = BLOCK + EOF_MARKER;

// ── ZIP ──────────────────────────────────────────────────────────────────────

pub fn zip(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let empty = package::stored(&[Part::new(MEMBER_NAME, Vec::new())])?;
    let Some(len) = budget.checked_sub(empty.len()).filter(|&n| n > 0) else {
        return Ok(empty);
    };
    let out = package::stored(&[Part::new(MEMBER_NAME, vec![b'0'; len])])?;
    if out.len() != budget {
        return Err(EncodeError::Layout(format!("zip is {} bytes, wanted {budget}", out.len())));
    }
    Ok(out)
}

// ── TAR ──────────────────────────────────────────────────────────────────────

fn pattern(len: usize, modulus: usize) -> Vec<u8> {
    (0..len).map(|i| (i % modulus) as u8).collect()
}

/// Single-member archive carrying `data_len` pattern bytes, with `trailing`
/// zero bytes after the end marker.
fn tar_with(data_len: usize, trailing: usize) -> io::Result<Vec<u8>> {
    let mut header = Header::new_ustar();
    header.set_path("dummy.bin")?;
    header.set_entry_type(EntryType::Regular);
    header.set_size(data_len as u64);
    header.set_mode(0o644);
    header.set_mtime(Utc::now().timestamp().max(0) as u64);
    header.set_cksum();

    let mut builder = Builder::new(Vec::with_capacity(MIN_ARCHIVE + data_len + trailing));
    builder.append(&header, pattern(data_len, 256).as_slice())?;
    let mut out = builder.into_inner()?;
    out.resize(out.len() + trailing, 0);
    Ok(out)
}

/// The largest block-aligned member fits, and the bytes short of the next
/// block extend the zero area after the end marker.
pub fn tar(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let room = budget.saturating_sub(MIN_ARCHIVE);
    let data_len = room / BLOCK * BLOCK;
    let out = tar_with(data_len, room - data_len)?;
    debug_assert_eq!(out.len(), budget.max(MIN_ARCHIVE));
    Ok(out)
}

// ── GZIP ─────────────────────────────────────────────────────────────────────

/// Fit a gzip member of a generated source into `budget`, halving the source
/// on overshoot, then zero-pad after the trailer.
fn gzip_fitted<F>(budget: usize, source: F) -> Result<Vec<u8>, EncodeError>
where
    F: Fn(usize) -> io::Result<Vec<u8>>,
{
    let start = budget.saturating_mul(2).min(MAX_SOURCE);
    let fitted = rescale(
        budget,
        start,
        0,
        |n| gzip::member(&source(n)?, Compression::default()),
        |n, _| (n > 0).then_some(n / 2),
    )?;
    Ok(pad_zeros(fitted.bytes, budget))
}

pub fn gz(budget: usize) -> Result<Vec<u8>, EncodeError> {
    gzip_fitted(budget, |n| Ok(pattern(n, 16)))
}

/// A gzip member whose payload is a TAR archive.
pub fn tgz(budget: usize) -> Result<Vec<u8>, EncodeError> {
    gzip_fitted(budget, |n| tar_with(n, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::{Cursor, Read};

    #[test]
    fn zip_has_one_stored_member() {
        let out = zip(10_000).unwrap();
        assert_eq!(out.len(), 10_000);
        let mut archive = ::zip::ZipArchive::new(Cursor::new(out)).unwrap();
        let mut text = String::new();
        archive.by_name(MEMBER_NAME).unwrap().read_to_string(&mut text).unwrap();
        assert!(text.bytes().all(|b| b == b'0'));
        assert!(zip(10).unwrap().len() > 10);
    }

    #[test]
    fn tar_sizes() {
        assert_eq!(tar(0).unwrap().len(), MIN_ARCHIVE);
        assert_eq!(tar(1536).unwrap().len(), 1536);
        assert_eq!(tar(2048).unwrap().len(), 2048);
        let odd = tar(5000).unwrap();
        assert_eq!(odd.len(), 5000);
        // 5000 - 1536 = 3464 -> six data blocks, 392 trailing bytes
        assert_eq!(&odd[124..136], b"00000006000\0");
    }

    #[test]
    fn tar_reads_back_with_trailing_zeros() {
        let out = tar(10_000).unwrap();
        assert_eq!(out.len(), 10_000);
        assert!(out[MIN_ARCHIVE + 16 * BLOCK..].iter().all(|&b| b == 0));

        let mut archive = ::tar::Archive::new(Cursor::new(out));
        let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
        let header = entry.header();
        assert_eq!(header.cksum().unwrap(), header.as_bytes().iter().enumerate()
            .map(|(i, &b)| if (148..156).contains(&i) { b' ' as u32 } else { b as u32 })
            .sum::<u32>());
        assert_eq!(header.mode().unwrap(), 0o644);
        assert_eq!(header.entry_type(), EntryType::Regular);
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        assert_eq!(data, pattern(16 * BLOCK, 256));
    }

    #[test]
    fn gz_crc_matches_payload() {
        let out = gz(300_000).unwrap();
        assert_eq!(out.len(), 300_000);
        let mut decoder = GzDecoder::new(&out[..]);
        let mut payload = Vec::new();
        decoder.read_to_end(&mut payload).unwrap();
        assert_eq!(payload, pattern(payload.len(), 16));
        assert!(!payload.is_empty());
    }

    #[test]
    fn tiny_gz_is_a_bare_member() {
        let out = gz(5).unwrap();
        assert_eq!(out.len(), gzip::MIN_MEMBER);
        assert_eq!(&out[..2], &[0x1F, 0x8B]);
    }

    #[test]
    fn tgz_wraps_a_tar() {
        let out = tgz(100_000).unwrap();
        assert_eq!(out.len(), 100_000);
        let mut inner = Vec::new();
        GzDecoder::new(&out[..]).read_to_end(&mut inner).unwrap();
        assert_eq!(&inner[257..263], b"ustar\0");
        assert_eq!(inner.len() % BLOCK, 0);
    }
}
