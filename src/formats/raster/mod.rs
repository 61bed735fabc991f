//! Raster images.
//!
//! Uncompressed formats (BMP, ICO, TIFF) size their pixel grid directly
//! from the budget. Compressed formats (PNG, JPEG, WebP, GIF) estimate a
//! grid, encode, and rescale through [`crate::reconcile::rescale`]. All of
//! them pad with zeros after the image data, which every decoder ignores.

pub mod bmp;
pub mod gif;
pub mod ico;
pub mod jpeg;
pub mod png;
pub mod tiff;
pub mod webp;

/// Diagonal gradient sample at `(x, y)`.
#[inline]
pub fn gradient(x: usize, y: usize) -> u8 {
    ((x + y) % 256) as u8
}

/// Near-square grid of at most `pixels` pixels, each side within
/// `1..=max_side`.
pub fn fit_rect(pixels: usize, max_side: usize) -> (usize, usize) {
    let side = ((pixels as f64).sqrt().floor() as usize).clamp(1, max_side);
    let height = (pixels / side).clamp(1, max_side);
    (side, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_bounded() {
        assert_eq!(fit_rect(0, 100), (1, 1));
        assert_eq!(fit_rect(10, 100), (3, 3));
        assert_eq!(fit_rect(1_000_000, 100), (100, 100));
        let (w, h) = fit_rect(5_000, 10_000);
        assert!(w * h <= 5_000);
    }

    #[test]
    fn gradient_wraps() {
        assert_eq!(gradient(0, 0), 0);
        assert_eq!(gradient(200, 100), 44);
    }
}
