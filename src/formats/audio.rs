//! Silent audio: WAV, Ogg Vorbis and FLAC.
//!
//! All three use the padding strategy. The skeleton carries every header a
//! player needs to identify the stream; the remainder is silence (WAV),
//! silent pages (Ogg) or metadata padding (FLAC).

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::io::Write;

use super::EncodeError;
use crate::container::ogg::{self, PageHeader, FLAG_BOS, FLAG_EOS, MAX_PAGE, PAGE_HEADER};
use crate::container::riff::{self, CHUNK_HEADER};

// ── WAV ──────────────────────────────────────────────────────────────────────

const SAMPLE_RATE: u32 = 44_100;
const CHANNELS: u16    = 2;
const BITS: u16        = 16;

pub const WAV_SKELETON: usize = 44;

pub fn wav(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let data_len = budget.saturating_sub(WAV_SKELETON);
    let block_align = CHANNELS * BITS / 8;

    let mut out = Vec::with_capacity(WAV_SKELETON + data_len);
    riff::write_chunk_header(&mut out, b"RIFF", (WAV_SKELETON - CHUNK_HEADER + data_len) as u32)?;
    out.write_all(b"WAVE")?;
    riff::write_chunk_header(&mut out, b"fmt ", 16)?;
    out.write_u16::<LittleEndian>(1)?; // PCM
    out.write_u16::<LittleEndian>(CHANNELS)?;
    out.write_u32::<LittleEndian>(SAMPLE_RATE)?;
    out.write_u32::<LittleEndian>(SAMPLE_RATE * block_align as u32)?;
    out.write_u16::<LittleEndian>(block_align)?;
    out.write_u16::<LittleEndian>(BITS)?;
    riff::write_chunk_header(&mut out, b"data", data_len as u32)?;
    out.resize(WAV_SKELETON + data_len, 0);
    Ok(out)
}

// ── Ogg Vorbis ───────────────────────────────────────────────────────────────

const OGG_SERIAL: u32 = 0x1234_5678;
const OGG_VENDOR: &[u8] = b"DummyFactory";
const SAMPLES_PER_PAGE: u64 = 4096;
/// Size of a full silent page.
const AUDIO_PAGE: usize = 4096;

fn vorbis_id() -> Result<Vec<u8>, EncodeError> {
    let mut p = Vec::with_capacity(30);
    p.write_u8(0x01)?;
    p.write_all(b"vorbis")?;
    p.write_u32::<LittleEndian>(0)?; // version
    p.write_u8(CHANNELS as u8)?;
    p.write_u32::<LittleEndian>(SAMPLE_RATE)?;
    p.write_u32::<LittleEndian>(0)?;      // bitrate maximum
    p.write_u32::<LittleEndian>(48_000)?; // bitrate nominal
    p.write_u32::<LittleEndian>(0)?;      // bitrate minimum
    p.write_u8(0xB8)?; // blocksizes 256 / 2048
    p.write_u8(0x01)?; // framing
    Ok(p)
}

fn vorbis_comment() -> Result<Vec<u8>, EncodeError> {
    let mut p = Vec::with_capacity(24);
    p.write_u8(0x03)?;
    p.write_all(b"vorbis")?;
    p.write_u32::<LittleEndian>(OGG_VENDOR.len() as u32)?;
    p.write_all(OGG_VENDOR)?;
    p.write_u32::<LittleEndian>(0)?; // no user comments
    p.write_u8(0x01)?;
    Ok(p)
}

fn vorbis_setup() -> Vec<u8> {
    let mut p = vec![0x05];
    p.extend_from_slice(b"vorbis");
    p.push(0x06); // codebook count - 1
    p.extend_from_slice(&[0; 7]);
    p.push(0x01);
    p
}

/// Split `total` bytes into page sizes in `PAGE_HEADER..=MAX_PAGE`.
/// `total` must be at least `PAGE_HEADER`.
fn page_sizes(total: usize) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(total / AUDIO_PAGE + 1);
    let mut left = total;
    while left > AUDIO_PAGE {
        // never leave a tail too small to hold a page header
        let take = if left - AUDIO_PAGE < PAGE_HEADER { left - PAGE_HEADER } else { AUDIO_PAGE };
        sizes.push(take);
        left -= take;
    }
    sizes.push(left);
    sizes
}

pub fn ogg(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let header = |flags, granule, sequence| PageHeader { flags, granule, serial: OGG_SERIAL, sequence };

    let mut out = ogg::packet_page(header(FLAG_BOS, 0, 0), &vorbis_id()?)?;
    out.extend_from_slice(&ogg::packet_page(header(0, 0, 1), &vorbis_comment()?)?);
    out.extend_from_slice(&ogg::packet_page(header(0, 0, 2), &vorbis_setup())?);

    let audio_total = budget.saturating_sub(out.len()).max(PAGE_HEADER);
    out.reserve(audio_total);
    let sizes = page_sizes(audio_total);
    let last = sizes.len() - 1;
    for (i, &size) in sizes.iter().enumerate() {
        debug_assert!(size <= MAX_PAGE);
        let lacing = ogg::exact_lacing(size)
            .ok_or_else(|| EncodeError::Layout(format!("no ogg lacing for a {size}-byte page")))?;
        let data_len = size - PAGE_HEADER - lacing.len();
        let flags = if i == last { FLAG_EOS } else { 0 };
        let granule = (i as u64 + 1) * SAMPLES_PER_PAGE;
        out.extend_from_slice(&ogg::page(header(flags, granule, 3 + i as u32), &lacing, &vec![0; data_len])?);
    }
    Ok(out)
}

// ── FLAC ─────────────────────────────────────────────────────────────────────

const FLAC_BLOCK_HEADER: usize = 4;
const STREAMINFO_LEN: usize    = 34;
const MAX_METADATA: usize      = (1 << 24) - 1;
const BLOCK_STREAMINFO: u8     = 0;
const BLOCK_PADDING: u8        = 1;
const LAST_BLOCK: u8           = 0x80;

/// `fLaC`, STREAMINFO and one empty PADDING block.
pub const FLAC_SKELETON: usize = 4 + FLAC_BLOCK_HEADER + STREAMINFO_LEN + FLAC_BLOCK_HEADER;

fn streaminfo() -> [u8; STREAMINFO_LEN] {
    let mut s = [0u8; STREAMINFO_LEN];
    s[0..2].copy_from_slice(&4096u16.to_be_bytes()); // min block size
    s[2..4].copy_from_slice(&4096u16.to_be_bytes()); // max block size
    // 20-bit rate, 3-bit channels - 1, 5-bit bits - 1, 36-bit total samples
    let packed: u64 = (SAMPLE_RATE as u64) << 44
        | ((CHANNELS as u64 - 1) << 41)
        | ((BITS as u64 - 1) << 36);
    s[10..18].copy_from_slice(&packed.to_be_bytes());
    s
}

fn write_block_header<W: Write>(mut w: W, kind: u8, last: bool, len: usize) -> std::io::Result<()> {
    w.write_u8(kind | if last { LAST_BLOCK } else { 0 })?;
    w.write_u24::<BigEndian>(len as u32)
}

pub fn flac(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let head = 4 + FLAC_BLOCK_HEADER + STREAMINFO_LEN;
    let mut out = Vec::with_capacity(budget.max(FLAC_SKELETON));
    out.write_all(b"fLaC")?;
    write_block_header(&mut out, BLOCK_STREAMINFO, false, STREAMINFO_LEN)?;
    out.write_all(&streaminfo())?;

    let mut left = budget.max(FLAC_SKELETON) - head;
    while left > 0 {
        let mut take = left.min(FLAC_BLOCK_HEADER + MAX_METADATA);
        if left - take > 0 && left - take < FLAC_BLOCK_HEADER {
            take = left - FLAC_BLOCK_HEADER;
        }
        left -= take;
        write_block_header(&mut out, BLOCK_PADDING, left == 0, take - FLAC_BLOCK_HEADER)?;
        out.resize(out.len() + take - FLAC_BLOCK_HEADER, 0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::{get_u32_le, ogg_crc};

    fn ogg_pages(buf: &[u8]) -> Vec<(u8, u32, usize)> {
        let mut pages = Vec::new();
        let mut at = 0;
        while at < buf.len() {
            assert_eq!(&buf[at..at + 4], b"OggS", "page at {at}");
            let nseg = buf[at + 26] as usize;
            let body: usize = buf[at + 27..at + 27 + nseg].iter().map(|&l| l as usize).sum();
            let len = PAGE_HEADER + nseg + body;
            let mut blank = buf[at..at + len].to_vec();
            blank[22..26].fill(0);
            assert_eq!(get_u32_le(buf, at + 22), ogg_crc(&blank));
            pages.push((buf[at + 5], get_u32_le(buf, at + 18), len));
            at += len;
        }
        assert_eq!(at, buf.len());
        pages
    }

    #[test]
    fn wav_header() {
        let w = wav(1000).unwrap();
        assert_eq!(w.len(), 1000);
        assert_eq!(&w[..4], b"RIFF");
        assert_eq!(get_u32_le(&w, 4), 992);
        assert_eq!(&w[8..16], b"WAVEfmt ");
        assert_eq!(get_u32_le(&w, 24), 44_100);
        assert_eq!(&w[36..40], b"data");
        assert_eq!(get_u32_le(&w, 40), 956);
        assert_eq!(wav(10).unwrap().len(), WAV_SKELETON);
    }

    #[test]
    fn ogg_pages_are_valid_and_exact() {
        for budget in [0, 200, 260, 4096 * 3 + 150, 1_000_003] {
            let out = ogg(budget).unwrap();
            let pages = ogg_pages(&out);
            assert!(out.len() >= budget);
            assert_eq!(pages[0].0, FLAG_BOS);
            assert_eq!(pages.last().unwrap().0, FLAG_EOS);
            let seqs: Vec<u32> = pages.iter().map(|p| p.1).collect();
            assert_eq!(seqs, (0..pages.len() as u32).collect::<Vec<_>>());
        }
        let floor = ogg(0).unwrap().len();
        assert_eq!(ogg(floor + 1).unwrap().len(), floor + 1);
    }

    #[test]
    fn page_split_never_leaves_a_stub() {
        for total in [27, 4096, 4097, 4096 + 26, 4096 + 27, 3 * 4096 + 5] {
            let sizes = page_sizes(total);
            assert_eq!(sizes.iter().sum::<usize>(), total);
            assert!(sizes.iter().all(|&s| (PAGE_HEADER..=MAX_PAGE).contains(&s)));
        }
    }

    #[test]
    fn flac_blocks_chain() {
        for budget in [0, 46, 47, 49, 50, 100_000] {
            let f = flac(budget).unwrap();
            assert_eq!(f.len(), budget.max(FLAC_SKELETON));
            assert_eq!(&f[..4], b"fLaC");
            assert_eq!(&f[18..22], &[0x0A, 0xC4, 0x42, 0xF0]);
            let mut at = 4;
            loop {
                let flag = f[at];
                let len = u32::from_be_bytes([0, f[at + 1], f[at + 2], f[at + 3]]) as usize;
                at += FLAC_BLOCK_HEADER + len;
                if flag & LAST_BLOCK != 0 {
                    break;
                }
            }
            assert_eq!(at, f.len());
        }
    }

    #[test]
    fn flac_splits_large_padding() {
        let budget = 2 * MAX_METADATA + 60;
        let f = flac(budget).unwrap();
        assert_eq!(f.len(), budget);
    }
}
