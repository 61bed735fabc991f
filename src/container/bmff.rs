//! ISO base media file format boxes.
//!
//! A box is a 32-bit big-endian size (header included), a four-character
//! type and a payload. Full boxes prefix the payload with a version byte and
//! 24 bits of flags. Payloads past `u32::MAX` switch to the 64-bit
//! `largesize` header.

use std::io::{self, Write};

pub const BOX_HEADER: usize       = 8;
pub const LARGE_BOX_HEADER: usize = 16;

/// Serialize a plain box.
pub fn bx(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = header(kind, payload.len() as u64);
    out.extend_from_slice(payload);
    out
}

/// Serialize a full box (version + flags).
pub fn full_box(kind: &[u8; 4], version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(4 + payload.len());
    body.push(version);
    body.extend_from_slice(&flags.to_be_bytes()[1..]);
    body.extend_from_slice(payload);
    bx(kind, &body)
}

/// Serialize a box whose payload is the concatenation of `children`.
pub fn container(kind: &[u8; 4], children: &[&[u8]]) -> Vec<u8> {
    bx(kind, &children.concat())
}

/// Header length needed for a payload of `payload_len` bytes.
pub fn header_len(payload_len: u64) -> usize {
    if payload_len + BOX_HEADER as u64 > u32::MAX as u64 { LARGE_BOX_HEADER } else { BOX_HEADER }
}

/// Header bytes of a box carrying `payload_len` bytes, switching to the
/// 64-bit `largesize` form when the 32-bit size would overflow.
pub fn header(kind: &[u8; 4], payload_len: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(LARGE_BOX_HEADER);
    if header_len(payload_len) == LARGE_BOX_HEADER {
        out.extend_from_slice(&1u32.to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(&(payload_len + LARGE_BOX_HEADER as u64).to_be_bytes());
    } else {
        out.extend_from_slice(&((payload_len + BOX_HEADER as u64) as u32).to_be_bytes());
        out.extend_from_slice(kind);
    }
    out
}

/// Write just the header of a box whose payload follows separately.
pub fn write_header<W: Write>(mut w: W, kind: &[u8; 4], payload_len: u64) -> io::Result<()> {
    w.write_all(&header(kind, payload_len))
}

/// A box located inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSpan {
    pub kind:   [u8; 4],
    pub offset: usize,
    pub header: usize,
    pub size:   usize,
}

impl BoxSpan {
    pub fn payload(&self) -> std::ops::Range<usize> {
        self.offset + self.header..self.offset + self.size
    }
}

/// Iterate the sibling boxes in `buf[range]`.
pub fn children(buf: &[u8], start: usize, end: usize) -> Vec<BoxSpan> {
    let mut out = Vec::new();
    let mut at = start;
    while at + BOX_HEADER <= end {
        let size32 = u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]) as usize;
        let kind = [buf[at + 4], buf[at + 5], buf[at + 6], buf[at + 7]];
        let (header, size) = match size32 {
            0 => (BOX_HEADER, end - at),
            1 if at + LARGE_BOX_HEADER <= end => {
                let mut b = [0u8; 8];
                b.copy_from_slice(&buf[at + 8..at + 16]);
                (LARGE_BOX_HEADER, u64::from_be_bytes(b) as usize)
            }
            n => (BOX_HEADER, n),
        };
        if size < header || at + size > end {
            break;
        }
        out.push(BoxSpan { kind, offset: at, header, size });
        at += size;
    }
    out
}

/// Find a box by path of types, e.g. `[b"moov", b"trak", b"mdia"]`.
///
/// Only descends through plain container boxes; full-box payload offsets
/// are the caller's concern.
pub fn find(buf: &[u8], path: &[&[u8; 4]]) -> Option<BoxSpan> {
    let (mut start, mut end) = (0, buf.len());
    let mut found = None;
    for kind in path {
        let span = children(buf, start, end).into_iter().find(|b| &b.kind == *kind)?;
        start = span.offset + span.header;
        end = span.offset + span.size;
        found = Some(span);
    }
    found
}
