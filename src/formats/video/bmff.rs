//! MP4, MOV and M4A files: `ftyp`, a one-track `moov`, and `mdat`.
//!
//! The sample table describes one sample covering the entire `mdat`
//! payload. `stsz` carries its size and `stco` its absolute offset, which is
//! the combined length of `ftyp`, `moov` and the `mdat` header. Both are
//! fixed-width fields, so `moov` is built once to measure and once more with
//! the final values at the same length.

use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

use super::{HEIGHT, WIDTH};
use crate::container::bmff::{self, bx, container, full_box};
use crate::formats::EncodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Mp4,
    Mov,
    M4a,
}

impl Flavor {
    fn major_brand(self) -> &'static [u8; 4] {
        match self {
            Flavor::Mp4 => b"isom",
            Flavor::Mov => b"qt  ",
            Flavor::M4a => b"M4A ",
        }
    }

    fn compatible_brands(self) -> &'static [&'static [u8; 4]] {
        match self {
            Flavor::Mp4 => &[b"isom", b"iso2", b"avc1", b"mp41"],
            Flavor::Mov => &[b"qt  "],
            Flavor::M4a => &[b"M4A ", b"mp42", b"isom"],
        }
    }

    fn is_audio(self) -> bool {
        self == Flavor::M4a
    }

    fn timescale(self) -> u32 {
        if self.is_audio() { 44_100 } else { 1_000 }
    }
}

const MATRIX: [u32; 9] = [0x0001_0000, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000];

fn write_matrix<W: Write>(mut w: W) -> io::Result<()> {
    for v in MATRIX {
        w.write_u32::<BigEndian>(v)?;
    }
    Ok(())
}

fn ftyp(flavor: Flavor) -> Vec<u8> {
    let mut p = flavor.major_brand().to_vec();
    p.extend_from_slice(&0x200u32.to_be_bytes());
    for brand in flavor.compatible_brands() {
        p.extend_from_slice(*brand);
    }
    bx(b"ftyp", &p)
}

fn mvhd(flavor: Flavor) -> io::Result<Vec<u8>> {
    let mut p = Vec::with_capacity(96);
    p.write_u32::<BigEndian>(0)?; // creation
    p.write_u32::<BigEndian>(0)?; // modification
    p.write_u32::<BigEndian>(flavor.timescale())?;
    p.write_u32::<BigEndian>(flavor.timescale())?; // one second
    p.write_u32::<BigEndian>(0x0001_0000)?; // rate 1.0
    p.write_u16::<BigEndian>(0x0100)?;      // volume 1.0
    p.write_all(&[0; 10])?;
    write_matrix(&mut p)?;
    p.write_all(&[0; 24])?;
    p.write_u32::<BigEndian>(2)?; // next track id
    Ok(full_box(b"mvhd", 0, 0, &p))
}

fn tkhd(flavor: Flavor) -> io::Result<Vec<u8>> {
    let mut p = Vec::with_capacity(80);
    p.write_u32::<BigEndian>(0)?;
    p.write_u32::<BigEndian>(0)?;
    p.write_u32::<BigEndian>(1)?; // track id
    p.write_u32::<BigEndian>(0)?;
    p.write_u32::<BigEndian>(flavor.timescale())?;
    p.write_all(&[0; 8])?;
    p.write_u16::<BigEndian>(0)?; // layer
    p.write_u16::<BigEndian>(0)?; // alternate group
    p.write_u16::<BigEndian>(if flavor.is_audio() { 0x0100 } else { 0 })?;
    p.write_u16::<BigEndian>(0)?;
    write_matrix(&mut p)?;
    let (w, h) = if flavor.is_audio() { (0, 0) } else { (WIDTH, HEIGHT) };
    p.write_u32::<BigEndian>(w << 16)?;
    p.write_u32::<BigEndian>(h << 16)?;
    Ok(full_box(b"tkhd", 0, 0x3, &p)) // enabled, in movie
}

fn mdhd(flavor: Flavor) -> io::Result<Vec<u8>> {
    let mut p = Vec::with_capacity(20);
    p.write_u32::<BigEndian>(0)?;
    p.write_u32::<BigEndian>(0)?;
    p.write_u32::<BigEndian>(flavor.timescale())?;
    p.write_u32::<BigEndian>(flavor.timescale())?;
    p.write_u16::<BigEndian>(0x55C4)?; // "und"
    p.write_u16::<BigEndian>(0)?;
    Ok(full_box(b"mdhd", 0, 0, &p))
}

fn hdlr(flavor: Flavor) -> Vec<u8> {
    let (kind, name): (&[u8; 4], &[u8]) = if flavor.is_audio() {
        (b"soun", b"SoundHandler\0")
    } else {
        (b"vide", b"VideoHandler\0")
    };
    let mut p = vec![0; 4];
    p.extend_from_slice(kind);
    p.extend_from_slice(&[0; 12]);
    p.extend_from_slice(name);
    full_box(b"hdlr", 0, 0, &p)
}

fn sample_entry(flavor: Flavor) -> io::Result<Vec<u8>> {
    let mut p = Vec::with_capacity(78);
    p.write_all(&[0; 6])?;
    p.write_u16::<BigEndian>(1)?; // data reference index
    if flavor.is_audio() {
        p.write_all(&[0; 8])?;
        p.write_u16::<BigEndian>(2)?;  // channels
        p.write_u16::<BigEndian>(16)?; // sample size
        p.write_u32::<BigEndian>(0)?;
        p.write_u32::<BigEndian>(44_100 << 16)?;
        Ok(bx(b"mp4a", &p))
    } else {
        p.write_all(&[0; 16])?;
        p.write_u16::<BigEndian>(WIDTH as u16)?;
        p.write_u16::<BigEndian>(HEIGHT as u16)?;
        p.write_u32::<BigEndian>(0x0048_0000)?; // 72 dpi
        p.write_u32::<BigEndian>(0x0048_0000)?;
        p.write_u32::<BigEndian>(0)?;
        p.write_u16::<BigEndian>(1)?; // frame count
        p.write_all(&[0; 32])?;       // compressor name
        p.write_u16::<BigEndian>(0x18)?;
        p.write_i16::<BigEndian>(-1)?;
        Ok(bx(b"avc1", &p))
    }
}

/// `stbl` for one sample of `sample_size` bytes at `chunk_offset`.
fn stbl(flavor: Flavor, sample_size: u32, chunk_offset: u32) -> io::Result<Vec<u8>> {
    let mut stsd = Vec::new();
    stsd.write_u32::<BigEndian>(1)?;
    stsd.write_all(&sample_entry(flavor)?)?;

    let mut stts = Vec::new();
    stts.write_u32::<BigEndian>(1)?;
    stts.write_u32::<BigEndian>(1)?;
    stts.write_u32::<BigEndian>(flavor.timescale())?;

    let mut stsc = Vec::new();
    stsc.write_u32::<BigEndian>(1)?;
    for v in [1, 1, 1] {
        stsc.write_u32::<BigEndian>(v)?;
    }

    let mut stsz = Vec::new();
    stsz.write_u32::<BigEndian>(0)?; // per-sample sizes follow
    stsz.write_u32::<BigEndian>(1)?;
    stsz.write_u32::<BigEndian>(sample_size)?;

    let mut stco = Vec::new();
    stco.write_u32::<BigEndian>(1)?;
    stco.write_u32::<BigEndian>(chunk_offset)?;

    Ok(container(b"stbl", &[
        &full_box(b"stsd", 0, 0, &stsd),
        &full_box(b"stts", 0, 0, &stts),
        &full_box(b"stsc", 0, 0, &stsc),
        &full_box(b"stsz", 0, 0, &stsz),
        &full_box(b"stco", 0, 0, &stco),
    ]))
}

fn moov(flavor: Flavor, sample_size: u32, chunk_offset: u32) -> io::Result<Vec<u8>> {
    let media_header = if flavor.is_audio() {
        full_box(b"smhd", 0, 0, &[0; 4])
    } else {
        full_box(b"vmhd", 0, 1, &[0; 8])
    };
    let mut dref = 1u32.to_be_bytes().to_vec();
    dref.extend_from_slice(&full_box(b"url ", 0, 1, &[])); // self-contained
    let dinf = container(b"dinf", &[&full_box(b"dref", 0, 0, &dref)]);

    let minf = container(b"minf", &[&media_header, &dinf, &stbl(flavor, sample_size, chunk_offset)?]);
    let mdia = container(b"mdia", &[&mdhd(flavor)?, &hdlr(flavor), &minf]);
    let trak = container(b"trak", &[&tkhd(flavor)?, &mdia]);
    Ok(container(b"moov", &[&mvhd(flavor)?, &trak]))
}

pub fn encode(flavor: Flavor, budget: usize) -> Result<Vec<u8>, EncodeError> {
    let ftyp = ftyp(flavor);
    let head = ftyp.len() + moov(flavor, 0, 0)?.len();

    let mut payload = budget.saturating_sub(head + bmff::BOX_HEADER);
    let mut mdat_header = bmff::header_len(payload as u64);
    if mdat_header == bmff::LARGE_BOX_HEADER {
        payload = payload.saturating_sub(bmff::LARGE_BOX_HEADER - bmff::BOX_HEADER);
        mdat_header = bmff::header_len(payload as u64);
    }

    let sample_size = u32::try_from(payload)
        .map_err(|_| EncodeError::Layout(format!("sample of {payload} bytes exceeds stsz range")))?;
    let moov = moov(flavor, sample_size, (head + mdat_header) as u32)?;

    let mut out = Vec::with_capacity(head + mdat_header + payload);
    out.extend_from_slice(&ftyp);
    out.extend_from_slice(&moov);
    bmff::write_header(&mut out, b"mdat", payload as u64)?;
    out.resize(head + mdat_header + payload, 0);
    Ok(out)
}
