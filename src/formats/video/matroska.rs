//! WebM and Matroska: EBML header, then one Segment holding Info, Tracks
//! and a single Cluster with one SimpleBlock.
//!
//! Segment, Cluster and SimpleBlock sizes are written as 8-byte VINTs so the
//! skeleton length does not depend on the payload. WebM grows the
//! SimpleBlock frame; Matroska keeps an empty frame and appends a `Void`
//! element to the Segment. The Segment size is exact, although players only
//! trust it for seeking.

use super::{HEIGHT, WIDTH};
use crate::container::ebml::{self, float, header_sized, master, string, uint, uint_wide};
use crate::formats::EncodeError;

const SIZE_WIDTH: usize = 8;
/// Track number VINT, relative timecode, keyframe flag.
const BLOCK_HEADER: [u8; 4] = [0x81, 0x00, 0x00, 0x80];
/// Smallest Void: one-byte id and one-byte size.
const MIN_VOID: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    Webm,
    Matroska,
}

impl DocType {
    pub fn name(self) -> &'static str {
        match self {
            DocType::Webm     => "webm",
            DocType::Matroska => "matroska",
        }
    }
}

fn info() -> Vec<u8> {
    master(ebml::INFO, &[
        &uint(ebml::TIMECODE_SCALE, 1_000_000),
        &float(ebml::DURATION, 1000.0),
        &string(ebml::MUXING_APP, "dummyforge"),
        &string(ebml::WRITING_APP, "dummyforge"),
    ])
}

fn tracks() -> Vec<u8> {
    let video = master(ebml::VIDEO, &[
        &uint(ebml::PIXEL_WIDTH, WIDTH as u64),
        &uint(ebml::PIXEL_HEIGHT, HEIGHT as u64),
    ]);
    let entry = master(ebml::TRACK_ENTRY, &[
        &uint(ebml::TRACK_NUMBER, 1),
        &uint(ebml::TRACK_UID, 1),
        &uint(ebml::TRACK_TYPE, 1), // video
        &string(ebml::CODEC_ID, "V_VP8"),
        &video,
    ]);
    master(ebml::TRACKS, &[&entry])
}

fn sized(id: u32, payload_len: usize) -> Result<Vec<u8>, EncodeError> {
    header_sized(id, payload_len as u64, SIZE_WIDTH)
        .ok_or_else(|| EncodeError::Layout(format!("element of {payload_len} bytes exceeds an 8-byte size")))
}

fn void(len: usize) -> Result<Vec<u8>, EncodeError> {
    let width = if len > 1 + SIZE_WIDTH { SIZE_WIDTH } else { 1 };
    let payload = len - 1 - width;
    let mut out = header_sized(ebml::VOID, payload as u64, width)
        .ok_or_else(|| EncodeError::Layout(format!("no void element of {len} bytes")))?;
    out.resize(len, 0);
    Ok(out)
}

pub fn encode(doc: DocType, budget: usize) -> Result<Vec<u8>, EncodeError> {
    let header = ebml::header(doc.name());
    let info = info();
    let tracks = tracks();
    let block_overhead = sized(ebml::SIMPLE_BLOCK, 0)?.len() + BLOCK_HEADER.len();
    let narrow_timecode = uint(ebml::TIMECODE, 0);
    let cluster_overhead = sized(ebml::CLUSTER, 0)?.len() + narrow_timecode.len() + block_overhead;
    let segment_overhead = sized(ebml::SEGMENT, 0)?.len();
    let skeleton = header.len() + segment_overhead + info.len() + tracks.len() + cluster_overhead;

    let rest = budget.saturating_sub(skeleton);
    let (frame, timecode, void_len) = match doc {
        DocType::Webm => (rest, narrow_timecode, 0),
        // a lone spare byte cannot form a Void, so it widens the timecode
        DocType::Matroska if rest == 1 => (0, uint_wide(ebml::TIMECODE, 0, 2), 0),
        DocType::Matroska => (0, narrow_timecode, rest),
    };
    debug_assert!(void_len == 0 || void_len >= MIN_VOID);

    let block_len = BLOCK_HEADER.len() + frame;
    let cluster_len = timecode.len() + sized(ebml::SIMPLE_BLOCK, block_len)?.len() + block_len;
    let segment_len = info.len() + tracks.len() + sized(ebml::CLUSTER, cluster_len)?.len() + cluster_len + void_len;

    let mut out = Vec::with_capacity(skeleton + rest);
    out.extend_from_slice(&header);
    out.extend_from_slice(&sized(ebml::SEGMENT, segment_len)?);
    out.extend_from_slice(&info);
    out.extend_from_slice(&tracks);
    out.extend_from_slice(&sized(ebml::CLUSTER, cluster_len)?);
    out.extend_from_slice(&timecode);
    out.extend_from_slice(&sized(ebml::SIMPLE_BLOCK, block_len)?);
    out.extend_from_slice(&BLOCK_HEADER);
    out.resize(out.len() + frame, 0);
    if void_len > 0 {
        out.extend_from_slice(&void(void_len)?);
    }
    Ok(out)
}
