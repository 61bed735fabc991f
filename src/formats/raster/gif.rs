//! GIF89a with a 256-entry grey palette.
//!
//! The LZW stream never builds multi-pixel strings: every pixel is a 9-bit
//! literal and a clear code is sent before the decoder's table would force
//! 10-bit codes. That makes the stream size a direct function of the pixel
//! count, which keeps dimension estimates close.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use super::{fit_rect, gradient};
use crate::formats::EncodeError;
use crate::reconcile::{pad_zeros, rescale, shrink_2d};
use crate::toolkit::bits::LsbWriter;

const MIN_CODE_SIZE: u8 = 8;
const CLEAR: u32 = 1 << MIN_CODE_SIZE;
const END: u32 = CLEAR + 1;
const CODE_BITS: u32 = MIN_CODE_SIZE as u32 + 1;
const LITERALS_PER_CLEAR: usize = 250;
const MAX_SIDE: usize = 4096;
const SUB_BLOCK: usize = 255;

/// Header, screen descriptor, palette, image descriptor, trailer.
const FIXED: usize = 6 + 7 + 768 + 10 + 1 + 1 + 1;

/// LZW-coded pixel stream.
fn lzw(width: usize, height: usize) -> Vec<u8> {
    let pixels = width * height;
    let mut w = LsbWriter::with_capacity(pixels * 9 / 8 + 16);
    w.bits(CLEAR, CODE_BITS);
    let mut since_clear = 0;
    for y in 0..height {
        for x in 0..width {
            if since_clear == LITERALS_PER_CLEAR {
                w.bits(CLEAR, CODE_BITS);
                since_clear = 0;
            }
            w.bits(gradient(x, y) as u32, CODE_BITS);
            since_clear += 1;
        }
    }
    w.bits(END, CODE_BITS);
    w.finish()
}

fn write_sub_blocks<W: Write>(mut w: W, data: &[u8]) -> io::Result<()> {
    for block in data.chunks(SUB_BLOCK) {
        w.write_u8(block.len() as u8)?;
        w.write_all(block)?;
    }
    w.write_u8(0)
}

pub fn image(width: usize, height: usize) -> Result<Vec<u8>, EncodeError> {
    let stream = lzw(width, height);
    let mut out = Vec::with_capacity(FIXED + stream.len() + stream.len() / SUB_BLOCK + 1);
    out.write_all(b"GIF89a")?;
    out.write_u16::<LittleEndian>(width as u16)?;
    out.write_u16::<LittleEndian>(height as u16)?;
    out.write_u8(0xF7)?; // global table, 8-bit colour resolution, 256 entries
    out.write_u8(0)?;
    out.write_u8(0)?;
    for i in 0..=255u8 {
        out.write_all(&[i, i, i])?;
    }
    out.write_u8(0x2C)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(width as u16)?;
    out.write_u16::<LittleEndian>(height as u16)?;
    out.write_u8(0)?;
    out.write_u8(MIN_CODE_SIZE)?;
    write_sub_blocks(&mut out, &stream)?;
    out.write_u8(0x3B)?;
    Ok(out)
}

/// Pixels whose encoding fits in `bytes` of payload, ignoring sub-block and
/// clear-code overhead.
fn pixels_for(bytes: usize) -> usize {
    bytes.saturating_sub(FIXED) * 8 / 9 * LITERALS_PER_CLEAR / (LITERALS_PER_CLEAR + 1) * SUB_BLOCK / (SUB_BLOCK + 1)
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let start = fit_rect(pixels_for(budget), MAX_SIDE);
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
