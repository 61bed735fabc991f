//! Ogg pages.
//!
//! A page is a 27-byte header, a lacing table of up to 255 segment lengths,
//! then the segment data. Any lacing value below 255 ends a packet.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io;

use crate::toolkit::{ogg_crc, put_u32_le};

pub const PAGE_HEADER: usize  = 27;
pub const MAX_SEGMENTS: usize = 255;
/// Largest payload a page can carry when every packet ends on the page.
pub const MAX_SHORT_SEGMENT: usize = 254;

pub const FLAG_BOS: u8       = 0x02;
pub const FLAG_EOS: u8       = 0x04;

#[derive(Debug, Clone, Copy)]
pub struct PageHeader {
    pub flags:    u8,
    pub granule:  u64,
    pub serial:   u32,
    pub sequence: u32,
}

/// Lacing values for one complete packet of `len` bytes.
pub fn packet_lacing(len: usize) -> Vec<u8> {
    let mut lacing = vec![255u8; len / 255];
    lacing.push((len % 255) as u8);
    lacing
}

/// Serialize and checksum one page.
pub fn page(header: PageHeader, lacing: &[u8], data: &[u8]) -> io::Result<Vec<u8>> {
    if lacing.len() > MAX_SEGMENTS {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "too many ogg segments"));
    }
    let declared: usize = lacing.iter().map(|&l| l as usize).sum();
    if declared != data.len() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "lacing does not cover page data"));
    }
    let mut out = Vec::with_capacity(PAGE_HEADER + lacing.len() + data.len());
    out.extend_from_slice(b"OggS");
    out.write_u8(0)?;
    out.write_u8(header.flags)?;
    out.write_u64::<LittleEndian>(header.granule)?;
    out.write_u32::<LittleEndian>(header.serial)?;
    out.write_u32::<LittleEndian>(header.sequence)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u8(lacing.len() as u8)?;
    out.extend_from_slice(lacing);
    out.extend_from_slice(data);
    let crc = ogg_crc(&out);
    put_u32_le(&mut out, 22, crc);
    Ok(out)
}

/// Page with one complete packet.
pub fn packet_page(header: PageHeader, packet: &[u8]) -> io::Result<Vec<u8>> {
    page(header, &packet_lacing(packet.len()), packet)
}

/// Lacing for a page of exactly `total` bytes made of short packets.
///
/// Returns `None` when `total` is below a bare page header or above what a
/// single page can hold.
pub fn exact_lacing(total: usize) -> Option<Vec<u8>> {
    let body = total.checked_sub(PAGE_HEADER)?;
    if body == 0 {
        return Some(Vec::new());
    }
    // n segments carry up to 254 * n bytes: n + 254n >= body
    let n = body.div_ceil(MAX_SHORT_SEGMENT + 1);
    if n > MAX_SEGMENTS {
        return None;
    }
    let mut data = body - n;
    let mut lacing = Vec::with_capacity(n);
    for _ in 0..n {
        let take = data.min(MAX_SHORT_SEGMENT);
        lacing.push(take as u8);
        data -= take;
    }
    (data == 0).then_some(lacing)
}

/// Largest page [`exact_lacing`] can describe.
pub const MAX_PAGE: usize = PAGE_HEADER + MAX_SEGMENTS * (MAX_SHORT_SEGMENT + 1);
