//! EBML variable-length integers.
//!
//! A VINT of width `w` (1..=8) starts with `w - 1` zero bits and a marker
//! bit, leaving `7 * w` value bits. The all-ones value of each width is
//! reserved for "unknown size" and never emitted for a known size.

pub const MAX_WIDTH: usize = 8;

/// Largest size representable in `width` bytes without hitting the reserved
/// all-ones pattern.
pub fn max_for_width(width: usize) -> u64 {
    (1u64 << (7 * width)) - 2
}

/// Smallest width able to carry `value`.
pub fn width_for(value: u64) -> usize {
    (1..=MAX_WIDTH).find(|&w| value <= max_for_width(w)).unwrap_or(MAX_WIDTH)
}

/// Encode `value` in exactly `width` bytes. Returns `None` if it does not fit.
pub fn encode_fixed(value: u64, width: usize) -> Option<Vec<u8>> {
    if width == 0 || width > MAX_WIDTH || value > max_for_width(width) {
        return None;
    }
    let marked = value | (1u64 << (7 * width));
    Some(marked.to_be_bytes()[8 - width..].to_vec())
}

/// Encode `value` at its minimal width.
pub fn encode(value: u64) -> Vec<u8> {
    let width = width_for(value);
    let marked = value | (1u64 << (7 * width));
    marked.to_be_bytes()[8 - width..].to_vec()
}

/// Decode a VINT at the start of `buf`, returning `(value, width)`.
#[cfg(test)]
pub(crate) fn decode(buf: &[u8]) -> Option<(u64, usize)> {
    let first = *buf.first()?;
    if first == 0 {
        return None;
    }
    let width = first.leading_zeros() as usize + 1;
    if buf.len() < width {
        return None;
    }
    let mut value = (first as u64) & (0xFF >> width);
    for &b in &buf[1..width] {
        value = (value << 8) | b as u64;
    }
    Some((value, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn minimal_widths() {
        assert_eq!(encode(0), vec![0x80]);
        assert_eq!(encode(126), vec![0xFE]);
        // 127 is the reserved one-byte pattern
        assert_eq!(encode(127), vec![0x40, 0x7F]);
        assert_eq!(encode(16382), vec![0x7F, 0xFE]);
        assert_eq!(encode(16383).len(), 3);
    }

    #[test]
    fn fixed_width() {
        assert_eq!(encode_fixed(1, 8).unwrap(), vec![1, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode_fixed(200, 1), None);
        assert_eq!(encode_fixed(0, 0), None);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(v in 0u64..(1u64 << 56) - 2) {
            let bytes = encode(v);
            prop_assert_eq!(decode(&bytes), Some((v, bytes.len())));
        }
    }
}
