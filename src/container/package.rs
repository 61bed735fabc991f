//! Stored (uncompressed) ZIP packages written through the `zip` crate.
//!
//! Storing keeps the archive length an exact affine function of the entry
//! lengths: growing one entry by `n` bytes grows the archive by `n`. The
//! timestamp is pinned to the DOS epoch so the same parts always produce
//! the same bytes.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One named entry.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

impl Part {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), data: data.into() }
    }
}

fn options() -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(zip::DateTime::default())
}

/// Write `parts` in order into a stored archive.
pub fn stored(parts: &[Part]) -> zip::result::ZipResult<Vec<u8>> {
    let capacity = parts.iter().map(|p| p.data.len() + 2 * p.name.len() + 76).sum::<usize>() + 22;
    let mut zip = ZipWriter::new(Cursor::new(Vec::with_capacity(capacity)));
    for part in parts {
        zip.start_file(part.name.as_str(), options())?;
        zip.write_all(&part.data)?;
    }
    Ok(zip.finish()?.into_inner())
}
