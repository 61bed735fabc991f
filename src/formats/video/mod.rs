//! Video and box-based audio containers.
//!
//! Each file holds a single track with a single sample that spans the whole
//! data region, so the padding strategy reduces to sizing that one sample.

pub mod avi;
pub mod bmff;
pub mod matroska;

/// Frame size declared by every video track.
pub const WIDTH: u32  = 320;
pub const HEIGHT: u32 = 240;
