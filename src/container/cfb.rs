//! OLE2 compound files (version 3, 512-byte sectors) holding one stream.
//!
//! Sector order is fixed: FAT sectors, DIFAT sectors, one directory sector,
//! then the stream. The stream always sits in the regular FAT, so it is
//! never shorter than the mini-stream cutoff. Its last sector is not padded
//! out; the directory records the exact stream length.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

pub const SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
pub const SECTOR: usize = 512;
pub const MINI_STREAM_CUTOFF: usize = 4096;

const FREESECT:   u32 = 0xFFFF_FFFF;
const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
const FATSECT:    u32 = 0xFFFF_FFFD;
const DIFSECT:    u32 = 0xFFFF_FFFC;
const NOSTREAM:   u32 = 0xFFFF_FFFF;

const FAT_PER_SECTOR: usize   = SECTOR / 4;
const DIFAT_PER_SECTOR: usize = FAT_PER_SECTOR - 1;
const HEADER_DIFAT: usize     = 109;
const DIR_ENTRY: usize        = 128;

/// Header, one FAT sector, one directory sector and a cutoff-sized stream.
pub const MIN_FILE: usize = SECTOR * 3 + MINI_STREAM_CUTOFF;

const MAX_LAYOUT_ROUNDS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub fat_sectors:   usize,
    pub difat_sectors: usize,
    pub stream_len:    usize,
}

impl Layout {
    fn stream_sectors(&self) -> usize {
        self.stream_len.div_ceil(SECTOR)
    }

    fn used_sectors(&self) -> usize {
        self.fat_sectors + self.difat_sectors + 1 + self.stream_sectors()
    }

    fn sufficient(&self) -> bool {
        self.fat_sectors * FAT_PER_SECTOR >= self.used_sectors()
            && self.difat_sectors * DIFAT_PER_SECTOR >= self.fat_sectors.saturating_sub(HEADER_DIFAT)
    }

    fn first_dir_sector(&self) -> usize {
        self.fat_sectors + self.difat_sectors
    }

    fn first_stream_sector(&self) -> usize {
        self.first_dir_sector() + 1
    }

    pub fn file_len(&self) -> usize {
        SECTOR * (1 + self.fat_sectors + self.difat_sectors + 1) + self.stream_len
    }

    /// Layout whose serialized length is exactly `total` bytes.
    /// Returns `None` below [`MIN_FILE`].
    pub fn for_file_len(total: usize) -> Option<Self> {
        if total < MIN_FILE {
            return None;
        }
        let mut layout = Layout { fat_sectors: 1, difat_sectors: 0, stream_len: 0 };
        for _ in 0..MAX_LAYOUT_ROUNDS {
            let overhead = SECTOR * (2 + layout.fat_sectors + layout.difat_sectors);
            layout.stream_len = total.checked_sub(overhead)?;
            if layout.sufficient() {
                return (layout.stream_len >= MINI_STREAM_CUTOFF).then_some(layout);
            }
            let need_fat = layout.used_sectors().div_ceil(FAT_PER_SECTOR);
            let need_difat = need_fat.saturating_sub(HEADER_DIFAT).div_ceil(DIFAT_PER_SECTOR);
            layout.fat_sectors = layout.fat_sectors.max(need_fat);
            layout.difat_sectors = layout.difat_sectors.max(need_difat);
        }
        None
    }
}

fn utf16_name(name: &str) -> ([u8; 64], u16) {
    let mut field = [0u8; 64];
    let mut len = 0;
    for (i, unit) in name.encode_utf16().take(31).enumerate() {
        field[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        len = i + 1;
    }
    (field, ((len + 1) * 2) as u16)
}

fn write_dir_entry<W: Write>(
    mut w: W,
    name: &str,
    kind: u8,
    child: u32,
    start: u32,
    size: u64,
) -> io::Result<()> {
    let (field, name_len) = utf16_name(name);
    w.write_all(&field)?;
    w.write_u16::<LittleEndian>(name_len)?;
    w.write_u8(kind)?;
    w.write_u8(1)?; // black
    w.write_u32::<LittleEndian>(NOSTREAM)?;
    w.write_u32::<LittleEndian>(NOSTREAM)?;
    w.write_u32::<LittleEndian>(child)?;
    w.write_all(&[0u8; 16])?; // clsid
    w.write_u32::<LittleEndian>(0)?;
    w.write_u64::<LittleEndian>(0)?;
    w.write_u64::<LittleEndian>(0)?;
    w.write_u32::<LittleEndian>(start)?;
    w.write_u64::<LittleEndian>(size)
}

fn write_empty_entry<W: Write>(mut w: W) -> io::Result<()> {
    w.write_all(&[0u8; 68])?;
    w.write_u32::<LittleEndian>(NOSTREAM)?;
    w.write_u32::<LittleEndian>(NOSTREAM)?;
    w.write_u32::<LittleEndian>(NOSTREAM)?;
    w.write_all(&[0u8; DIR_ENTRY - 80])
}

/// Serialize a compound file with `layout`, filling the named stream by
/// repeating `pattern`.
pub fn write(layout: &Layout, stream_name: &str, pattern: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(layout.file_len());
    let fat_start = 0usize;
    let difat_start = layout.fat_sectors;
    let dir_sector = layout.first_dir_sector();
    let stream_start = layout.first_stream_sector();

    // header
    out.write_all(&SIGNATURE)?;
    out.write_all(&[0u8; 16])?;
    out.write_u16::<LittleEndian>(0x003E)?;
    out.write_u16::<LittleEndian>(0x0003)?;
    out.write_u16::<LittleEndian>(0xFFFE)?;
    out.write_u16::<LittleEndian>(9)?;
    out.write_u16::<LittleEndian>(6)?;
    out.write_all(&[0u8; 6])?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(layout.fat_sectors as u32)?;
    out.write_u32::<LittleEndian>(dir_sector as u32)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(MINI_STREAM_CUTOFF as u32)?;
    out.write_u32::<LittleEndian>(ENDOFCHAIN)?;
    out.write_u32::<LittleEndian>(0)?;
    let first_difat = if layout.difat_sectors > 0 { difat_start as u32 } else { ENDOFCHAIN };
    out.write_u32::<LittleEndian>(first_difat)?;
    out.write_u32::<LittleEndian>(layout.difat_sectors as u32)?;
    for i in 0..HEADER_DIFAT {
        let v = if i < layout.fat_sectors { (fat_start + i) as u32 } else { FREESECT };
        out.write_u32::<LittleEndian>(v)?;
    }

    // FAT
    let stream_sectors = layout.stream_sectors();
    for i in 0..layout.fat_sectors * FAT_PER_SECTOR {
        let v = match i {
            i if i < difat_start => FATSECT,
            i if i < dir_sector => DIFSECT,
            i if i == dir_sector => ENDOFCHAIN,
            i if i < stream_start + stream_sectors => {
                if i + 1 == stream_start + stream_sectors { ENDOFCHAIN } else { i as u32 + 1 }
            }
            _ => FREESECT,
        };
        out.write_u32::<LittleEndian>(v)?;
    }

    // DIFAT
    for s in 0..layout.difat_sectors {
        for j in 0..DIFAT_PER_SECTOR {
            let fat_index = HEADER_DIFAT + s * DIFAT_PER_SECTOR + j;
            let v = if fat_index < layout.fat_sectors { fat_index as u32 } else { FREESECT };
            out.write_u32::<LittleEndian>(v)?;
        }
        let next = if s + 1 < layout.difat_sectors { (difat_start + s + 1) as u32 } else { ENDOFCHAIN };
        out.write_u32::<LittleEndian>(next)?;
    }

    // directory
    write_dir_entry(&mut out, "Root Entry", 5, 1, ENDOFCHAIN, 0)?;
    write_dir_entry(&mut out, stream_name, 2, NOSTREAM, stream_start as u32, layout.stream_len as u64)?;
    write_empty_entry(&mut out)?;
    write_empty_entry(&mut out)?;

    // stream
    if pattern.is_empty() {
        out.resize(layout.file_len(), 0);
    } else {
        while out.len() < layout.file_len() {
            let take = pattern.len().min(layout.file_len() - out.len());
            out.extend_from_slice(&pattern[..take]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::get_u32_le;

    fn fat_entry(file: &[u8], layout: &Layout, index: usize) -> u32 {
        let fat_sector = index / FAT_PER_SECTOR;
        let sector_no = if fat_sector < HEADER_DIFAT {
            get_u32_le(file, 76 + fat_sector * 4) as usize
        } else {
            let k = fat_sector - HEADER_DIFAT;
            let difat = layout.fat_sectors + k / DIFAT_PER_SECTOR;
            get_u32_le(file, SECTOR * (1 + difat) + (k % DIFAT_PER_SECTOR) * 4) as usize
        };
        get_u32_le(file, SECTOR * (1 + sector_no) + (index % FAT_PER_SECTOR) * 4)
    }

    fn check(total: usize) {
        let layout = Layout::for_file_len(total).unwrap();
        let file = write(&layout, "WordDocument", b"Dummy DOC file content. ").unwrap();
        assert_eq!(file.len(), total);
        assert_eq!(&file[..8], &SIGNATURE);

        let dir = get_u32_le(&file, 48) as usize;
        let entry = SECTOR * (1 + dir) + DIR_ENTRY;
        assert_eq!(file[entry + 66], 2);
        let start = get_u32_le(&file, entry + 116);
        let size = get_u32_le(&file, entry + 120) as usize;
        assert_eq!(size, layout.stream_len);

        let mut sector = start;
        let mut count = 0;
        while sector != ENDOFCHAIN {
            count += 1;
            sector = fat_entry(&file, &layout, sector as usize);
        }
        assert_eq!(count, size.div_ceil(SECTOR));
        let data_at = SECTOR * (1 + start as usize);
        assert!(file[data_at..].starts_with(b"Dummy DOC"));
    }

    #[test]
    fn minimum_file() {
        assert!(Layout::for_file_len(MIN_FILE - 1).is_none());
        check(MIN_FILE);
        check(MIN_FILE + 1);
    }

    #[test]
    fn multi_fat_sector_file() {
        check(200_000);
        check(1_048_576);
    }

    #[test]
    fn difat_needed_past_109_fat_sectors() {
        // 109 FAT sectors map ~6.8 MiB
        let total = 8 * 1_048_576 + 3;
        let layout = Layout::for_file_len(total).unwrap();
        assert!(layout.fat_sectors > HEADER_DIFAT);
        assert_eq!(layout.difat_sectors, 1);
        check(total);
    }
}
