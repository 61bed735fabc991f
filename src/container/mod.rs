//! Container primitives: each module knows how to frame a payload for one
//! family of formats and how to keep its length fields honest.

pub mod bmff;
pub mod cfb;
pub mod ebml;
pub mod gzip;
pub mod ogg;
pub mod package;
pub mod riff;
pub mod tiff;
