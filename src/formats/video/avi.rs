//! AVI: `RIFF AVI ` with a `hdrl` list, one uncompressed `00db` frame in
//! `movi`, and a `JUNK` chunk carrying the remainder.
//!
//! No `idx1` is written and `AVIF_HASINDEX` stays clear. The last chunk may
//! have an odd length; its pad byte would sit past the end of the file and is
//! omitted.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use crate::container::riff::{self, CHUNK_HEADER};
use crate::formats::raster::bmp;
use crate::formats::EncodeError;

const FRAME_WIDTH: u32  = 80;
const FRAME_HEIGHT: u32 = 60;
const FPS: u32          = 30;
const FRAME_BYTES: usize = (FRAME_WIDTH * FRAME_HEIGHT * 4) as usize;

fn avih() -> io::Result<Vec<u8>> {
    let mut p = Vec::with_capacity(56);
    p.write_u32::<LittleEndian>(1_000_000 / FPS)?;
    p.write_u32::<LittleEndian>(FRAME_BYTES as u32 * FPS)?;
    p.write_u32::<LittleEndian>(0)?; // padding granularity
    p.write_u32::<LittleEndian>(0)?; // flags
    p.write_u32::<LittleEndian>(1)?; // total frames
    p.write_u32::<LittleEndian>(0)?;
    p.write_u32::<LittleEndian>(1)?; // streams
    p.write_u32::<LittleEndian>(FRAME_BYTES as u32)?;
    p.write_u32::<LittleEndian>(FRAME_WIDTH)?;
    p.write_u32::<LittleEndian>(FRAME_HEIGHT)?;
    p.write_all(&[0; 16])?;
    Ok(riff::chunk(b"avih", &p))
}

fn strh() -> io::Result<Vec<u8>> {
    let mut p = Vec::with_capacity(56);
    p.write_all(b"vids")?;
    p.write_all(b"DIB ")?;
    p.write_u32::<LittleEndian>(0)?; // flags
    p.write_u16::<LittleEndian>(0)?; // priority
    p.write_u16::<LittleEndian>(0)?; // language
    p.write_u32::<LittleEndian>(0)?; // initial frames
    p.write_u32::<LittleEndian>(1)?; // scale
    p.write_u32::<LittleEndian>(FPS)?;
    p.write_u32::<LittleEndian>(0)?; // start
    p.write_u32::<LittleEndian>(1)?; // length
    p.write_u32::<LittleEndian>(FRAME_BYTES as u32)?;
    p.write_i32::<LittleEndian>(-1)?; // default quality
    p.write_u32::<LittleEndian>(0)?;
    p.write_u16::<LittleEndian>(0)?;
    p.write_u16::<LittleEndian>(0)?;
    p.write_u16::<LittleEndian>(FRAME_WIDTH as u16)?;
    p.write_u16::<LittleEndian>(FRAME_HEIGHT as u16)?;
    Ok(riff::chunk(b"strh", &p))
}

fn hdrl() -> io::Result<Vec<u8>> {
    let mut strf = Vec::with_capacity(bmp::INFO_HEADER);
    bmp::write_info_header(&mut strf, FRAME_WIDTH, FRAME_HEIGHT, FRAME_BYTES as u32)?;
    let strl = riff::list(b"strl", &[&strh()?, &riff::chunk(b"strf", &strf)]);
    Ok(riff::list(b"hdrl", &[&avih()?, &strl]))
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let hdrl = hdrl()?;
    // RIFF header + form, hdrl, LIST movi header + form, frame chunk
    let skeleton = CHUNK_HEADER + 4 + hdrl.len() + CHUNK_HEADER + 4 + CHUNK_HEADER + FRAME_BYTES;
    let rest = budget.saturating_sub(skeleton);
    // A remainder too small for a JUNK header widens the frame chunk instead.
    let (frame_len, junk) = if rest >= CHUNK_HEADER { (FRAME_BYTES, Some(rest - CHUNK_HEADER)) } else { (FRAME_BYTES + rest, None) };
    let total = skeleton + rest;

    let mut out = Vec::with_capacity(total);
    riff::write_chunk_header(&mut out, b"RIFF", (total - CHUNK_HEADER) as u32)?;
    out.write_all(b"AVI ")?;
    out.write_all(&hdrl)?;
    let movi_start = out.len();
    riff::write_chunk_header(&mut out, b"LIST", (total - movi_start - CHUNK_HEADER) as u32)?;
    out.write_all(b"movi")?;
    riff::write_chunk_header(&mut out, b"00db", frame_len as u32)?;
    out.extend_from_slice(&bmp::bgra_pixels(FRAME_WIDTH as usize, FRAME_HEIGHT as usize));
    out.resize(out.len() + frame_len - FRAME_BYTES, 0);
    if let Some(junk) = junk {
        riff::write_chunk_header(&mut out, b"JUNK", junk as u32)?;
        out.resize(out.len() + junk, 0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::get_u32_le;

    /// Walk `(id, size)` of the chunks in `buf[start..end]`.
    fn walk(buf: &[u8], start: usize, end: usize) -> Vec<([u8; 4], usize, usize)> {
        let mut out = Vec::new();
        let mut at = start;
        while at < end {
            let id = [buf[at], buf[at + 1], buf[at + 2], buf[at + 3]];
            let size = get_u32_le(buf, at + 4) as usize;
            out.push((id, at, size));
            at += CHUNK_HEADER + size + (size & 1);
        }
        out
    }

    #[test]
    fn chunk_tree_is_consistent() {
        for budget in [0, 20_000, 20_001, 1_000_000] {
            let avi = encode(budget).unwrap();
            assert!(avi.len() >= budget);
            assert_eq!(&avi[8..12], b"AVI ");
            assert_eq!(get_u32_le(&avi, 4) as usize, avi.len() - 8);
            let top = walk(&avi, 12, avi.len());
            assert_eq!(&top[0].0, b"LIST");
            assert_eq!(&avi[top[0].1 + 8..top[0].1 + 12], b"hdrl");
            let (id, movi, size) = top[1];
            assert_eq!(&id, b"LIST");
            assert_eq!(movi + CHUNK_HEADER + size, avi.len());
            let inner = walk(&avi, movi + 12, avi.len());
            assert_eq!(&inner[0].0, b"00db");
        }
    }

    #[test]
    fn small_remainders_widen_the_frame() {
        let floor = encode(0).unwrap().len();
        for extra in 1..CHUNK_HEADER {
            let avi = encode(floor + extra).unwrap();
            assert_eq!(avi.len(), floor + extra);
            let frame = avi.windows(4).position(|w| w == b"00db").unwrap();
            assert_eq!(get_u32_le(&avi, frame + 4) as usize, FRAME_BYTES + extra);
        }
        let with_junk = encode(floor + CHUNK_HEADER).unwrap();
        assert_eq!(&with_junk[floor..floor + 4], b"JUNK");
    }
}
