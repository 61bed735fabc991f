//! Windows bitmap, 32 bits per pixel, bottom-up BGRA rows.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use super::{fit_rect, gradient};
use crate::formats::EncodeError;
use crate::reconcile::pad_zeros;
use crate::toolkit::put_u32_le;

pub const FILE_HEADER: usize = 14;
pub const INFO_HEADER: usize = 40;
pub const HEADERS: usize     = FILE_HEADER + INFO_HEADER;
const MAX_SIDE: usize        = 10_000;

/// 40-byte BITMAPINFOHEADER for an uncompressed 32-bit image.
pub fn write_info_header<W: Write>(mut w: W, width: u32, height: u32, image_size: u32) -> io::Result<()> {
    w.write_u32::<LittleEndian>(INFO_HEADER as u32)?;
    w.write_i32::<LittleEndian>(width as i32)?;
    w.write_i32::<LittleEndian>(height as i32)?;
    w.write_u16::<LittleEndian>(1)?;
    w.write_u16::<LittleEndian>(32)?;
    w.write_u32::<LittleEndian>(0)?;
    w.write_u32::<LittleEndian>(image_size)?;
    w.write_i32::<LittleEndian>(2835)?; // 72 dpi
    w.write_i32::<LittleEndian>(2835)?;
    w.write_u32::<LittleEndian>(0)?;
    w.write_u32::<LittleEndian>(0)
}

/// Bottom-up BGRA gradient pixels.
pub fn bgra_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut px = Vec::with_capacity(width * height * 4);
    for y in (0..height).rev() {
        for x in 0..width {
            let v = gradient(x, y);
            px.extend_from_slice(&[v, v, v, 0xFF]);
        }
    }
    px
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = fit_rect(budget.saturating_sub(HEADERS) / 4, MAX_SIDE);
    let pixels = bgra_pixels(width, height);

    let mut out = Vec::with_capacity(budget.max(HEADERS + pixels.len()));
    out.write_all(b"BM")?;
    out.write_u32::<LittleEndian>(0)?; // patched below
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(HEADERS as u32)?;
    write_info_header(&mut out, width as u32, height as u32, pixels.len() as u32)?;
    out.extend_from_slice(&pixels);

    let mut out = pad_zeros(out, budget);
    let total = out.len() as u32;
    put_u32_le(&mut out, 2, total);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::get_u32_le;

    #[test]
    fn exact_with_restamped_file_size() {
        for budget in [58, 59, 1000, 1_048_576, 1_000_001] {
            let out = encode(budget).unwrap();
            assert_eq!(out.len(), budget);
            assert_eq!(&out[..2], b"BM");
            assert_eq!(get_u32_le(&out, 2) as usize, budget);
            let w = get_u32_le(&out, 18) as usize;
            let h = get_u32_le(&out, 22) as usize;
            assert!(HEADERS + w * h * 4 <= budget);
            assert_eq!(get_u32_le(&out, 34) as usize, w * h * 4);
        }
    }

    #[test]
    fn tiny_budget_gives_one_pixel() {
        let out = encode(10).unwrap();
        assert_eq!(out.len(), HEADERS + 4);
        assert_eq!(get_u32_le(&out, 2) as usize, out.len());
    }
}
