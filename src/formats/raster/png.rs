//! PNG, 8-bit truecolour, zlib-compressed IDAT.

use byteorder::{BigEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Write};

use super::{fit_rect, gradient};
use crate::formats::EncodeError;
use crate::reconcile::{pad_zeros, rescale, shrink_2d};
use crate::toolkit::crc32_parts;

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const MAX_SIDE: usize = 1024;

fn write_chunk<W: Write>(mut w: W, kind: &[u8; 4], data: &[u8]) -> io::Result<()> {
    w.write_u32::<BigEndian>(data.len() as u32)?;
    w.write_all(kind)?;
    w.write_all(data)?;
    w.write_u32::<BigEndian>(crc32_parts(&[kind, data]))
}

/// Encode a `width` x `height` gradient.
pub fn image(width: usize, height: usize) -> Result<Vec<u8>, EncodeError> {
    let mut ihdr = Vec::with_capacity(13);
    ihdr.write_u32::<BigEndian>(width as u32)?;
    ihdr.write_u32::<BigEndian>(height as u32)?;
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]); // depth, RGB, deflate, adaptive, no interlace

    let mut z = ZlibEncoder::new(Vec::new(), Compression::fast());
    let mut row = Vec::with_capacity(1 + width * 3);
    for y in 0..height {
        row.clear();
        row.push(0); // filter: none
        for x in 0..width {
            let v = gradient(x, y);
            row.extend_from_slice(&[v, v.wrapping_mul(3), 255 - v]);
        }
        z.write_all(&row)?;
    }
    let idat = z.finish()?;

    let mut out = Vec::with_capacity(8 + 25 + 12 + idat.len() + 12);
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr)?;
    write_chunk(&mut out, b"IDAT", &idat)?;
    write_chunk(&mut out, b"IEND", &[])?;
    Ok(out)
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let start = fit_rect(budget / 3, MAX_SIDE);
    let fitted = rescale(
        budget,
        start,
        (1, 1),
        |(w, h)| image(w, h),
        |(w, h), actual| {
            if w == 1 && h == 1 {
                return None;
            }
            let w2 = (shrink_2d(w as u32, actual, budget) as usize).max(1);
            let h2 = (shrink_2d(h as u32, actual, budget) as usize).max(1);
            Some((w2, h2))
        },
    )?;
    Ok(pad_zeros(fitted.bytes, budget))
}
