//! Windows icon with a single 32-bit DIB image and its AND mask.

use byteorder::{LittleEndian, WriteBytesExt};

use super::bmp::{bgra_pixels, write_info_header, INFO_HEADER};
use crate::formats::EncodeError;
use crate::reconcile::pad_zeros;

const ICONDIR: usize = 6;
const ENTRY: usize   = 16;
const MAX_SIDE: usize = 256;

fn mask_row(side: usize) -> usize {
    side.div_ceil(32) * 4
}

fn image_len(side: usize) -> usize {
    INFO_HEADER + side * side * 4 + mask_row(side) * side
}

/// Smallest icon: one pixel.
pub const SKELETON: usize = ICONDIR + ENTRY + INFO_HEADER + 4 + 4;

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let fits = |s: usize| ICONDIR + ENTRY + image_len(s) <= budget;
    let mut side = ((budget.saturating_sub(ICONDIR + ENTRY + INFO_HEADER) / 4) as f64)
        .sqrt()
        .floor() as usize;
    side = side.clamp(1, MAX_SIDE);
    while side > 1 && !fits(side) {
        side -= 1;
    }

    let image = image_len(side);
    let mut out = Vec::with_capacity(budget.max(ICONDIR + ENTRY + image));
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(1)?; // icon
    out.write_u16::<LittleEndian>(1)?;

    let dim = if side == MAX_SIDE { 0 } else { side as u8 };
    out.write_u8(dim)?;
    out.write_u8(dim)?;
    out.write_u8(0)?;
    out.write_u8(0)?;
    out.write_u16::<LittleEndian>(1)?;
    out.write_u16::<LittleEndian>(32)?;
    out.write_u32::<LittleEndian>(image as u32)?;
    out.write_u32::<LittleEndian>((ICONDIR + ENTRY) as u32)?;

    // height covers XOR and AND planes
    write_info_header(&mut out, side as u32, (side * 2) as u32, (image - INFO_HEADER) as u32)?;
    out.extend_from_slice(&bgra_pixels(side, side));
    out.resize(out.len() + mask_row(side) * side, 0);

    Ok(pad_zeros(out, budget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::get_u32_le;

    #[test]
    fn skeleton_and_exact() {
        assert_eq!(encode(0).unwrap().len(), SKELETON);
        assert_eq!(SKELETON, 70);
        for budget in [70, 71, 500, 10_000, 300_000, 2_000_000] {
            let out = encode(budget).unwrap();
            assert_eq!(out.len(), budget);
            assert_eq!(&out[..4], &[0, 0, 1, 0]);
            let size = get_u32_le(&out, 14) as usize;
            assert!(22 + size <= budget);
        }
    }

    #[test]
    fn large_budget_caps_at_256() {
        let out = encode(2_000_000).unwrap();
        assert_eq!(out[6], 0);
        assert_eq!(get_u32_le(&out, 22 + 4), 256);
    }
}
