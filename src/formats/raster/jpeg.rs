//! Baseline sequential JPEG, single greyscale component, standard Huffman
//! tables.

use byteorder::{BigEndian, WriteBytesExt};
use std::f32::consts::PI;
use std::io::{self, Write};

use super::{fit_rect, gradient};
use crate::formats::EncodeError;
use crate::reconcile::{pad_zeros, rescale, shrink_2d};

const MAX_SIDE: usize = 1024;
pub const START_QUALITY: u8 = 90;
pub const MIN_QUALITY: u8 = 10;
const QUALITY_STEP: u8 = 10;

const ZIGZAG: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10, 17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34, 27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

const LUMA_QUANT: [u16; 64] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

const DC_BITS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const DC_VALS: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const AC_BITS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7D];
const AC_VALS: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08, 0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7,
    0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5,
    0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
    0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];

/// IJG quality scaling of the standard luminance table, natural order.
pub fn quant_table(quality: u8) -> [u16; 64] {
    let q = quality.clamp(1, 100) as u32;
    let scale = if q < 50 { 5000 / q } else { 200 - 2 * q };
    let mut table = [0u16; 64];
    for (t, &base) in table.iter_mut().zip(LUMA_QUANT.iter()) {
        *t = ((base as u32 * scale + 50) / 100).clamp(1, 255) as u16;
    }
    table
}

/// Canonical Huffman codes indexed by symbol: `(code, length)`.
fn huffman_codes(bits: &[u8; 16], vals: &[u8]) -> [(u16, u8); 256] {
    let mut codes = [(0u16, 0u8); 256];
    let mut code = 0u16;
    let mut k = 0;
    for (i, &n) in bits.iter().enumerate() {
        for _ in 0..n {
            codes[vals[k] as usize] = (code, i as u8 + 1);
            code += 1;
            k += 1;
        }
        code <<= 1;
    }
    codes
}

// ── Bit writer ───────────────────────────────────────────────────────────────

struct BitWriter {
    out:   Vec<u8>,
    acc:   u32,
    nbits: u8,
}

impl BitWriter {
    fn new(capacity: usize) -> Self {
        Self { out: Vec::with_capacity(capacity), acc: 0, nbits: 0 }
    }

    fn put(&mut self, code: u16, len: u8) {
        for i in (0..len).rev() {
            self.acc = (self.acc << 1) | ((code >> i) & 1) as u32;
            self.nbits += 1;
            if self.nbits == 8 {
                let byte = self.acc as u8;
                self.out.push(byte);
                if byte == 0xFF {
                    self.out.push(0x00);
                }
                self.acc = 0;
                self.nbits = 0;
            }
        }
    }

    /// Pad the final byte with one bits.
    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.put((1u16 << pad) - 1, pad);
        }
        self.out
    }
}

fn magnitude(v: i32) -> (u8, u16) {
    if v == 0 {
        return (0, 0);
    }
    let n = (32 - v.unsigned_abs().leading_zeros()) as u8;
    let bits = if v < 0 { (v - 1) & ((1 << n) - 1) } else { v };
    (n, bits as u16)
}

// ── DCT ──────────────────────────────────────────────────────────────────────

struct Dct {
    cos: [[f32; 8]; 8],
}

impl Dct {
    fn new() -> Self {
        let mut cos = [[0f32; 8]; 8];
        for (u, row) in cos.iter_mut().enumerate() {
            let c = if u == 0 { (0.5f32).sqrt() } else { 1.0 };
            for (x, v) in row.iter_mut().enumerate() {
                *v = 0.5 * c * (((2 * x + 1) as f32 * u as f32 * PI) / 16.0).cos();
            }
        }
        Self { cos }
    }

    /// Forward 8x8 DCT of level-shifted samples, natural order.
    fn forward(&self, block: &[f32; 64]) -> [f32; 64] {
        let mut tmp = [0f32; 64];
        for y in 0..8 {
            for u in 0..8 {
                tmp[y * 8 + u] = (0..8).map(|x| self.cos[u][x] * block[y * 8 + x]).sum();
            }
        }
        let mut out = [0f32; 64];
        for v in 0..8 {
            for u in 0..8 {
                out[v * 8 + u] = (0..8).map(|y| self.cos[v][y] * tmp[y * 8 + u]).sum();
            }
        }
        out
    }
}

// ── Markers ──────────────────────────────────────────────────────────────────

fn write_segment<W: Write>(mut w: W, marker: u8, body: &[u8]) -> io::Result<()> {
    w.write_all(&[0xFF, marker])?;
    w.write_u16::<BigEndian>(body.len() as u16 + 2)?;
    w.write_all(body)
}

fn dht_body(class_id: u8, bits: &[u8; 16], vals: &[u8]) -> Vec<u8> {
    let mut body = vec![class_id];
    body.extend_from_slice(bits);
    body.extend_from_slice(vals);
    body
}

/// Encode a `width` x `height` greyscale gradient.
pub fn image(width: usize, height: usize, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let quant = quant_table(quality);
    let dc = huffman_codes(&DC_BITS, &DC_VALS);
    let ac = huffman_codes(&AC_BITS, &AC_VALS);
    let dct = Dct::new();

    let mut out = Vec::new();
    out.extend_from_slice(&[0xFF, 0xD8]);
    write_segment(&mut out, 0xE0, b"JFIF\0\x01\x01\x00\x00\x01\x00\x01\x00\x00")?;

    let mut dqt = vec![0u8];
    dqt.extend(ZIGZAG.iter().map(|&n| quant[n] as u8));
    write_segment(&mut out, 0xDB, &dqt)?;

    let mut sof: Vec<u8> = vec![8];
    sof.write_u16::<BigEndian>(height as u16)?;
    sof.write_u16::<BigEndian>(width as u16)?;
    sof.extend_from_slice(&[1, 1, 0x11, 0]);
    write_segment(&mut out, 0xC0, &sof)?;

    write_segment(&mut out, 0xC4, &dht_body(0x00, &DC_BITS, &DC_VALS))?;
    write_segment(&mut out, 0xC4, &dht_body(0x10, &AC_BITS, &AC_VALS))?;
    write_segment(&mut out, 0xDA, &[1, 1, 0x00, 0, 63, 0])?;

    let mut bits = BitWriter::new(width * height / 4);
    let mut prev_dc = 0i32;
    let mut block = [0f32; 64];
    for by in (0..height).step_by(8) {
        for bx in (0..width).step_by(8) {
            for y in 0..8 {
                for x in 0..8 {
                    // edge blocks repeat the last row/column
                    let sx = (bx + x).min(width - 1);
                    let sy = (by + y).min(height - 1);
                    block[y * 8 + x] = gradient(sx, sy) as f32 - 128.0;
                }
            }
            let coef = dct.forward(&block);
            let mut zz = [0i32; 64];
            for (k, &n) in ZIGZAG.iter().enumerate() {
                zz[k] = (coef[n] / quant[n] as f32).round() as i32;
            }

            let diff = zz[0] - prev_dc;
            prev_dc = zz[0];
            let (n, v) = magnitude(diff);
            let (code, len) = dc[n as usize];
            bits.put(code, len);
            bits.put(v, n);

            let mut run = 0u8;
            for &c in &zz[1..] {
                if c == 0 {
                    run += 1;
                    continue;
                }
                while run > 15 {
                    let (code, len) = ac[0xF0];
                    bits.put(code, len);
                    run -= 16;
                }
                let (n, v) = magnitude(c);
                let (code, len) = ac[((run << 4) | n) as usize];
                bits.put(code, len);
                bits.put(v, n);
                run = 0;
            }
            if run > 0 {
                let (code, len) = ac[0x00];
                bits.put(code, len);
            }
        }
    }
    out.extend_from_slice(&bits.finish());
    out.extend_from_slice(&[0xFF, 0xD9]);
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Params {
    quality: u8,
    width:   usize,
    height:  usize,
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = fit_rect(budget.saturating_mul(2), MAX_SIDE);
    let start = Params { quality: START_QUALITY, width, height };
    let floor = Params { quality: MIN_QUALITY, width: 1, height: 1 };
    let fitted = rescale(
        budget,
        start,
        floor,
        |p| image(p.width, p.height, p.quality),
        |p, actual| {
            if p.quality > MIN_QUALITY {
                return Some(Params { quality: p.quality - QUALITY_STEP, ..p });
            }
            if p.width == 1 && p.height == 1 {
                return None;
            }
            Some(Params {
                width: (shrink_2d(p.width as u32, actual, budget) as usize).max(1),
                height: (shrink_2d(p.height as u32, actual, budget) as usize).max(1),
                ..p
            })
        },
    )?;
    Ok(pad_zeros(fitted.bytes, budget))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Segment markers up to SOS and the offset where scan data begins.
    fn markers(jpeg: &[u8]) -> (Vec<u8>, usize) {
        let mut found = Vec::new();
        let mut at = 2;
        while at + 4 <= jpeg.len() && jpeg[at] == 0xFF {
            let m = jpeg[at + 1];
            found.push(m);
            let len = u16::from_be_bytes([jpeg[at + 2], jpeg[at + 3]]) as usize;
            at += 2 + len;
            if m == 0xDA {
                break;
            }
        }
        (found, at)
    }

    #[test]
    fn segment_order() {
        let j = image(17, 9, 75).unwrap();
        assert_eq!(&j[..2], &[0xFF, 0xD8]);
        assert_eq!(&j[j.len() - 2..], &[0xFF, 0xD9]);
        assert_eq!(markers(&j).0, vec![0xE0, 0xDB, 0xC0, 0xC4, 0xC4, 0xDA]);
    }

    #[test]
    fn entropy_data_is_stuffed() {
        let j = image(64, 64, 90).unwrap();
        let (_, scan_start) = markers(&j);
        let scan = &j[scan_start..j.len() - 2];
        for w in scan.windows(2) {
            if w[0] == 0xFF {
                assert_eq!(w[1], 0x00);
            }
        }
    }

    #[test]
    fn lower_quality_is_smaller() {
        let hi = image(128, 128, 90).unwrap();
        let lo = image(128, 128, 10).unwrap();
        assert!(lo.len() < hi.len());
    }

    #[test]
    fn quality_scaling() {
        assert_eq!(quant_table(50), LUMA_QUANT);
        assert!(quant_table(100).iter().all(|&q| q == 1));
        assert!(quant_table(10).iter().all(|&q| q >= 50));
    }

    #[test]
    fn magnitude_categories() {
        assert_eq!(magnitude(0), (0, 0));
        assert_eq!(magnitude(1), (1, 1));
        assert_eq!(magnitude(-1), (1, 0));
        assert_eq!(magnitude(-3), (2, 0));
        assert_eq!(magnitude(5), (3, 5));
    }

    #[test]
    fn exact_budgets() {
        for budget in [400, 5_000, 100_000, 1_048_576] {
            let out = encode(budget).unwrap();
            assert_eq!(out.len(), budget);
            assert_eq!(&out[..3], &[0xFF, 0xD8, 0xFF]);
        }
    }
}
