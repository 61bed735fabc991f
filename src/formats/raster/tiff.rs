//! Baseline TIFF: little-endian, 8-bit RGB, one uncompressed strip.

use super::{fit_rect, gradient};
use crate::container::tiff::{header, ifd_len, write_ifd, IfdEntry, HEADER_LEN};
use crate::formats::EncodeError;
use crate::reconcile::pad_zeros;

const MAX_SIDE: usize = 10_000;

fn entries(width: u32, height: u32, strip_offset: u32) -> Vec<IfdEntry> {
    let strip_len = width * height * 3;
    vec![
        IfdEntry::long(256, width),
        IfdEntry::long(257, height),
        IfdEntry::short(258, &[8, 8, 8]),
        IfdEntry::short(259, &[1]),        // no compression
        IfdEntry::short(262, &[2]),        // RGB
        IfdEntry::long(273, strip_offset),
        IfdEntry::short(277, &[3]),
        IfdEntry::long(278, height),
        IfdEntry::long(279, strip_len),
        IfdEntry::rational(282, 72, 1),
        IfdEntry::rational(283, 72, 1),
    ]
}

/// Header and directory, without pixels.
pub fn overhead() -> usize {
    HEADER_LEN + ifd_len(&entries(1, 1, 0))
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = fit_rect(budget.saturating_sub(overhead()) / 3, MAX_SIDE);
    let strip_offset = overhead() as u32;

    let mut out = Vec::with_capacity(budget.max(overhead() + width * height * 3));
    out.extend_from_slice(&header(HEADER_LEN as u32));
    let mut ifd = entries(width as u32, height as u32, strip_offset);
    out.extend_from_slice(&write_ifd(&mut ifd, HEADER_LEN as u32)?);
    for y in 0..height {
        for x in 0..width {
            let v = gradient(x, y);
            out.extend_from_slice(&[v, v, v]);
        }
    }
    Ok(pad_zeros(out, budget))
}
