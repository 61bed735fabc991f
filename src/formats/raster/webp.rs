//! Lossless WebP (VP8L) in a RIFF container.
//!
//! The image is greyscale, so after the subtract-green transform only the
//! green channel carries information. Green uses a flat 8-bit prefix code
//! over the 256 literals; red, blue, alpha and distance each use a
//! one-symbol code that costs no bits per pixel. Output size is therefore a
//! fixed header plus one byte per pixel, and quality is not a lever here.

use super::{fit_rect, gradient};
use crate::container::riff;
use crate::formats::EncodeError;
use crate::reconcile::{pad_zeros, rescale, shrink_2d};
use crate::toolkit::bits::LsbWriter;

const SIGNATURE: u8 = 0x2F;
const MAX_SIDE: usize = 4096;
const GREEN_ALPHABET: usize = 256 + 24;
const TRANSFORM_SUBTRACT_GREEN: u32 = 2;

/// Order in which code-length code lengths are transmitted.
const CODE_LENGTH_ORDER: [usize; 19] = [17, 18, 0, 1, 2, 3, 4, 5, 16, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

/// Approximate bytes outside the pixel payload.
const OVERHEAD: usize = 96;

/// A prefix code with a single zero-length symbol.
fn simple_single(w: &mut LsbWriter, symbol: u8) {
    w.bits(1, 1); // simple
    w.bits(0, 1); // one symbol
    if symbol <= 1 {
        w.bits(0, 1);
        w.bits(symbol as u32, 1);
    } else {
        w.bits(1, 1);
        w.bits(symbol as u32, 8);
    }
}

/// Green code: every literal gets length 8, backward references and cache
/// symbols get length 0.
fn flat_green(w: &mut LsbWriter) {
    w.bits(0, 1); // normal code
    let used = CODE_LENGTH_ORDER.iter().position(|&s| s == 8).map_or(19, |p| p + 1);
    w.bits((used - 4) as u32, 4);
    for &sym in &CODE_LENGTH_ORDER[..used] {
        // code-length symbols 0 and 8 each get a 1-bit code
        w.bits(if sym == 0 || sym == 8 { 1 } else { 0 }, 3);
    }
    w.bits(0, 1); // lengths for the whole alphabet
    for s in 0..GREEN_ALPHABET {
        // canonical order: symbol 0 -> "0", symbol 8 -> "1"
        w.code(if s < 256 { 1 } else { 0 }, 1);
    }
}

/// VP8L bitstream for a `width` x `height` greyscale gradient.
pub fn bitstream(width: usize, height: usize) -> Vec<u8> {
    let mut w = LsbWriter::with_capacity(width * height + OVERHEAD);
    w.bits(SIGNATURE as u32, 8);
    w.bits(width as u32 - 1, 14);
    w.bits(height as u32 - 1, 14);
    w.bits(0, 1); // alpha unused
    w.bits(0, 3); // version

    w.bits(1, 1);
    w.bits(TRANSFORM_SUBTRACT_GREEN, 2);
    w.bits(0, 1); // no further transforms

    w.bits(0, 1); // no colour cache
    w.bits(0, 1); // no meta prefix codes
    flat_green(&mut w);
    simple_single(&mut w, 0);   // red
    simple_single(&mut w, 0);   // blue
    simple_single(&mut w, 255); // alpha
    simple_single(&mut w, 0);   // distance

    for y in 0..height {
        for x in 0..width {
            w.code(gradient(x, y) as u32, 8);
        }
    }
    w.finish()
}

pub fn image(width: usize, height: usize) -> Vec<u8> {
    riff::riff(b"WEBP", &riff::chunk(b"VP8L", &bitstream(width, height)))
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let start = fit_rect(budget.saturating_sub(OVERHEAD), MAX_SIDE);
    let fitted = rescale(
        budget,
        start,
        (1, 1),
        |(w, h)| Ok::<_, EncodeError>(image(w, h)),
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
