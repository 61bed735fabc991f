//! Little-endian TIFF image file directories.
//!
//! Values that do not fit the 4-byte inline slot are written to an overflow
//! area directly after the IFD and referenced by offset.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io;

pub const HEADER_LEN: usize = 8;
pub const ENTRY_LEN: usize  = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    Short    = 3,
    Long     = 4,
    Rational = 5,
}

impl FieldType {
    fn size(self) -> usize {
        match self {
            FieldType::Short    => 2,
            FieldType::Long     => 4,
            FieldType::Rational => 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IfdEntry {
    pub tag:    u16,
    pub kind:   FieldType,
    /// Raw values; a rational is two consecutive u32 values.
    pub values: Vec<u32>,
}

impl IfdEntry {
    pub fn short(tag: u16, values: &[u16]) -> Self {
        Self { tag, kind: FieldType::Short, values: values.iter().map(|&v| v as u32).collect() }
    }
    pub fn long(tag: u16, value: u32) -> Self {
        Self { tag, kind: FieldType::Long, values: vec![value] }
    }
    pub fn rational(tag: u16, num: u32, den: u32) -> Self {
        Self { tag, kind: FieldType::Rational, values: vec![num, den] }
    }

    fn count(&self) -> u32 {
        match self.kind {
            FieldType::Rational => (self.values.len() / 2) as u32,
            _ => self.values.len() as u32,
        }
    }

    fn byte_len(&self) -> usize {
        self.count() as usize * self.kind.size()
    }

    fn write_values(&self, out: &mut Vec<u8>) -> io::Result<()> {
        for &v in &self.values {
            match self.kind {
                FieldType::Short => out.write_u16::<LittleEndian>(v as u16)?,
                _ => out.write_u32::<LittleEndian>(v)?,
            }
        }
        Ok(())
    }
}

/// Size of an IFD with `entries` entries plus the overflow values it needs.
pub fn ifd_len(entries: &[IfdEntry]) -> usize {
    let overflow: usize = entries.iter().map(|e| e.byte_len()).filter(|&n| n > 4).sum();
    2 + entries.len() * ENTRY_LEN + 4 + overflow
}

/// Serialize an IFD that will be placed at `ifd_offset` in the file.
/// Entries are sorted by tag as readers require.
pub fn write_ifd(entries: &mut [IfdEntry], ifd_offset: u32) -> io::Result<Vec<u8>> {
    entries.sort_by_key(|e| e.tag);
    let mut out = Vec::with_capacity(ifd_len(entries));
    let mut overflow = Vec::new();
    let mut overflow_at = ifd_offset as usize + 2 + entries.len() * ENTRY_LEN + 4;

    out.write_u16::<LittleEndian>(entries.len() as u16)?;
    for e in entries.iter() {
        out.write_u16::<LittleEndian>(e.tag)?;
        out.write_u16::<LittleEndian>(e.kind as u16)?;
        out.write_u32::<LittleEndian>(e.count())?;
        if e.byte_len() <= 4 {
            let mut inline = Vec::with_capacity(4);
            e.write_values(&mut inline)?;
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.write_u32::<LittleEndian>(overflow_at as u32)?;
            e.write_values(&mut overflow)?;
            overflow_at += e.byte_len();
        }
    }
    out.write_u32::<LittleEndian>(0)?; // no next IFD
    out.extend_from_slice(&overflow);
    Ok(out)
}

/// `II*\0` followed by the first IFD offset.
pub fn header(first_ifd: u32) -> [u8; HEADER_LEN] {
    let o = first_ifd.to_le_bytes();
    [b'I', b'I', 42, 0, o[0], o[1], o[2], o[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_and_overflow_values() {
        let mut entries = vec![
            IfdEntry::rational(282, 72, 1),
            IfdEntry::long(256, 4),
            IfdEntry::short(258, &[8, 8, 8]),
        ];
        let len = ifd_len(&entries);
        let ifd = write_ifd(&mut entries, 8).unwrap();
        assert_eq!(ifd.len(), len);
        assert_eq!(u16::from_le_bytes([ifd[0], ifd[1]]), 3);
        // sorted: 256 first
        assert_eq!(u16::from_le_bytes([ifd[2], ifd[3]]), 256);
        // 258's three shorts overflow right after the next-IFD pointer
        let off = u32::from_le_bytes([ifd[2 + 12 + 8], ifd[2 + 12 + 9], ifd[2 + 12 + 10], ifd[2 + 12 + 11]]);
        assert_eq!(off as usize, 8 + 2 + 3 * 12 + 4);
    }

    #[test]
    fn magic() {
        assert_eq!(&header(8)[..4], b"II*\0");
    }
}
