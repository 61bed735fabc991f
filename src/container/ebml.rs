//! EBML elements for WebM and Matroska.
//!
//! Element ids are stored with their length marker already included
//! (`0x1A45DFA3` is written as four bytes), sizes are VINTs.

use crate::toolkit::vint;

// ── Element ids ──────────────────────────────────────────────────────────────

pub const EBML:                  u32 = 0x1A45_DFA3;
pub const EBML_VERSION:          u32 = 0x4286;
pub const EBML_READ_VERSION:     u32 = 0x42F7;
pub const EBML_MAX_ID_LENGTH:    u32 = 0x42F2;
pub const EBML_MAX_SIZE_LENGTH:  u32 = 0x42F3;
pub const DOC_TYPE:              u32 = 0x4282;
pub const DOC_TYPE_VERSION:      u32 = 0x4287;
pub const DOC_TYPE_READ_VERSION: u32 = 0x4285;

pub const SEGMENT:        u32 = 0x1853_8067;
pub const INFO:           u32 = 0x1549_A966;
pub const TIMECODE_SCALE: u32 = 0x2A_D7B1;
pub const DURATION:       u32 = 0x4489;
pub const MUXING_APP:     u32 = 0x4D80;
pub const WRITING_APP:    u32 = 0x5741;

pub const TRACKS:        u32 = 0x1654_AE6B;
pub const TRACK_ENTRY:   u32 = 0xAE;
pub const TRACK_NUMBER:  u32 = 0xD7;
pub const TRACK_UID:     u32 = 0x73C5;
pub const TRACK_TYPE:    u32 = 0x83;
pub const CODEC_ID:      u32 = 0x86;
pub const VIDEO:         u32 = 0xE0;
pub const PIXEL_WIDTH:   u32 = 0xB0;
pub const PIXEL_HEIGHT:  u32 = 0xBA;

pub const CLUSTER:      u32 = 0x1F43_B675;
pub const TIMECODE:     u32 = 0xE7;
pub const SIMPLE_BLOCK: u32 = 0xA3;
pub const VOID:         u32 = 0xEC;

/// Width of an element id, derived from its leading marker bit.
pub fn id_width(id: u32) -> usize {
    match id {
        0..=0xFF           => 1,
        0x100..=0xFFFF     => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _                  => 4,
    }
}

fn push_id(out: &mut Vec<u8>, id: u32) {
    let w = id_width(id);
    out.extend_from_slice(&id.to_be_bytes()[4 - w..]);
}

/// Element with a minimal-width size.
pub fn element(id: u32, payload: &[u8]) -> Vec<u8> {
    let size = vint::encode(payload.len() as u64);
    let mut out = Vec::with_capacity(id_width(id) + size.len() + payload.len());
    push_id(&mut out, id);
    out.extend_from_slice(&size);
    out.extend_from_slice(payload);
    out
}

/// Id and `width`-byte size of an element whose payload is written later.
pub fn header_sized(id: u32, payload_len: u64, width: usize) -> Option<Vec<u8>> {
    let size = vint::encode_fixed(payload_len, width)?;
    let mut out = Vec::with_capacity(id_width(id) + width);
    push_id(&mut out, id);
    out.extend_from_slice(&size);
    Some(out)
}

/// Unsigned integer element, big-endian, minimal non-zero width.
pub fn uint(id: u32, value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = (value.leading_zeros() / 8).min(7) as usize;
    element(id, &bytes[skip..])
}

/// Unsigned integer element padded to `width` payload bytes.
pub fn uint_wide(id: u32, value: u64, width: usize) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    element(id, &bytes[8 - width.clamp(1, 8)..])
}

pub fn float(id: u32, value: f64) -> Vec<u8> {
    element(id, &value.to_be_bytes())
}

pub fn string(id: u32, value: &str) -> Vec<u8> {
    element(id, value.as_bytes())
}

pub fn master(id: u32, children: &[&[u8]]) -> Vec<u8> {
    element(id, &children.concat())
}

/// EBML header declaring `doc_type` (`webm` or `matroska`).
pub fn header(doc_type: &str) -> Vec<u8> {
    master(EBML, &[
        &uint(EBML_VERSION, 1),
        &uint(EBML_READ_VERSION, 1),
        &uint(EBML_MAX_ID_LENGTH, 4),
        &uint(EBML_MAX_SIZE_LENGTH, 8),
        &string(DOC_TYPE, doc_type),
        &uint(DOC_TYPE_VERSION, 4),
        &uint(DOC_TYPE_READ_VERSION, 2),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_keep_their_marker() {
        assert_eq!(id_width(EBML), 4);
        assert_eq!(id_width(TIMECODE_SCALE), 3);
        assert_eq!(id_width(DURATION), 2);
        assert_eq!(id_width(VOID), 1);
        assert_eq!(element(VOID, &[]), vec![0xEC, 0x80]);
    }

    #[test]
    fn uint_is_minimal() {
        assert_eq!(uint(TRACK_NUMBER, 1), vec![0xD7, 0x81, 0x01]);
        assert_eq!(uint(TIMECODE, 0), vec![0xE7, 0x81, 0x00]);
        assert_eq!(uint(TIMECODE_SCALE, 1_000_000), vec![0x2A, 0xD7, 0xB1, 0x83, 0x0F, 0x42, 0x40]);
        assert_eq!(uint_wide(TIMECODE, 0, 2), vec![0xE7, 0x82, 0, 0]);
    }

    #[test]
    fn header_starts_with_magic() {
        let h = header("webm");
        assert_eq!(&h[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
        assert!(h.windows(4).any(|w| w == b"webm"));
    }

    #[test]
    fn fixed_size_width() {
        let h = header_sized(SEGMENT, 3, 8).unwrap();
        assert_eq!(h.len(), 4 + 8);
        assert_eq!(&h[..4], &[0x18, 0x53, 0x80, 0x67]);
        assert_eq!(&h[4..], &[0x01, 0, 0, 0, 0, 0, 0, 3]);
        assert!(header_sized(VOID, 200, 1).is_none());
    }
}
