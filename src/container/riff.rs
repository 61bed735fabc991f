//! RIFF chunks: four-character id, little-endian u32 size, payload, and a
//! pad byte when the payload length is odd. The pad is not counted in the
//! declared size.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

pub const CHUNK_HEADER: usize = 8;

pub fn write_chunk_header<W: Write>(mut w: W, id: &[u8; 4], size: u32) -> io::Result<()> {
    w.write_all(id)?;
    w.write_u32::<LittleEndian>(size)
}

/// Serialize one chunk including its pad byte.
pub fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(CHUNK_HEADER + payload.len() + 1);
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// A `LIST` chunk of the given form type wrapping already-serialized chunks.
pub fn list(form: &[u8; 4], children: &[&[u8]]) -> Vec<u8> {
    let mut body = form.to_vec();
    for c in children {
        body.extend_from_slice(c);
    }
    chunk(b"LIST", &body)
}

/// The outer `RIFF` chunk. `body` excludes the form type.
pub fn riff(form: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + body.len());
    payload.extend_from_slice(form);
    payload.extend_from_slice(body);
    chunk(b"RIFF", &payload)
}
