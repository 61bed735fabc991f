//! Format encoders.
//!
//! Every built-in encoder is a variant of [`EncoderId`] and is dispatched by
//! `match`. Callers that need a format this crate does not know can implement
//! [`FormatEncoder`] and register it by extension.
//!
//! An encoder receives the exact byte budget and returns exactly that many
//! bytes, except when the budget is below the format's skeleton, in which
//! case the skeleton is returned as-is.

pub mod archive;
pub mod audio;
pub mod document;
pub mod raster;
pub mod text;
pub mod video;

use std::io;
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Layout error: {0}")]
    Layout(String),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── Encoder trait ────────────────────────────────────────────────────────────

pub trait FormatEncoder: Send + Sync {
    /// Short diagnostic name.
    fn name(&self) -> &str;

    /// Produce `budget` bytes of a valid file, or the skeleton if larger.
    fn encode(&self, budget: usize) -> Result<Vec<u8>, EncodeError>;

    /// Whether the encoder does enough CPU work to be moved off the async
    /// executor.
    fn is_blocking(&self) -> bool { false }
}

// ── EncoderId enum ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderId {
    // text
    Plain,
    Json,
    Csv,
    Xml,
    Html,
    Svg,
    Rtf,
    // raster
    Png,
    Jpeg,
    Webp,
    Gif,
    Bmp,
    Ico,
    Tiff,
    // audio
    Wav,
    Ogg,
    Flac,
    M4a,
    // video
    Mp4,
    Mov,
    Gifv,
    Avi,
    Webm,
    Mkv,
    // documents
    Pdf,
    Docx,
    Pptx,
    Xlsx,
    Doc,
    Ppt,
    Xls,
    // archives
    Zip,
    Tar,
    Gz,
    Tgz,
}

impl EncoderId {
    pub const ALL: [EncoderId; 35] = [
        EncoderId::Plain, EncoderId::Json, EncoderId::Csv, EncoderId::Xml,
        EncoderId::Html, EncoderId::Svg, EncoderId::Rtf,
        EncoderId::Png, EncoderId::Jpeg, EncoderId::Webp, EncoderId::Gif,
        EncoderId::Bmp, EncoderId::Ico, EncoderId::Tiff,
        EncoderId::Wav, EncoderId::Ogg, EncoderId::Flac, EncoderId::M4a,
        EncoderId::Mp4, EncoderId::Mov, EncoderId::Gifv, EncoderId::Avi,
        EncoderId::Webm, EncoderId::Mkv,
        EncoderId::Pdf, EncoderId::Docx, EncoderId::Pptx, EncoderId::Xlsx,
        EncoderId::Doc, EncoderId::Ppt, EncoderId::Xls,
        EncoderId::Zip, EncoderId::Tar, EncoderId::Gz, EncoderId::Tgz,
    ];

    /// Human-readable name (diagnostics only).
    pub fn name(self) -> &'static str {
        match self {
            EncoderId::Plain => "plain",
            EncoderId::Json  => "json",
            EncoderId::Csv   => "csv",
            EncoderId::Xml   => "xml",
            EncoderId::Html  => "html",
            EncoderId::Svg   => "svg",
            EncoderId::Rtf   => "rtf",
            EncoderId::Png   => "png",
            EncoderId::Jpeg  => "jpeg",
            EncoderId::Webp  => "webp",
            EncoderId::Gif   => "gif",
            EncoderId::Bmp   => "bmp",
            EncoderId::Ico   => "ico",
            EncoderId::Tiff  => "tiff",
            EncoderId::Wav   => "wav",
            EncoderId::Ogg   => "ogg",
            EncoderId::Flac  => "flac",
            EncoderId::M4a   => "m4a",
            EncoderId::Mp4   => "mp4",
            EncoderId::Mov   => "mov",
            EncoderId::Gifv  => "gifv",
            EncoderId::Avi   => "avi",
            EncoderId::Webm  => "webm",
            EncoderId::Mkv   => "mkv",
            EncoderId::Pdf   => "pdf",
            EncoderId::Docx  => "docx",
            EncoderId::Pptx  => "pptx",
            EncoderId::Xlsx  => "xlsx",
            EncoderId::Doc   => "doc",
            EncoderId::Ppt   => "ppt",
            EncoderId::Xls   => "xls",
            EncoderId::Zip   => "zip",
            EncoderId::Tar   => "tar",
            EncoderId::Gz    => "gz",
            EncoderId::Tgz   => "tgz",
        }
    }

    /// Library-backed and iterative encoders run on the blocking pool.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            EncoderId::Png | EncoderId::Jpeg | EncoderId::Webp | EncoderId::Gif
                | EncoderId::Pdf | EncoderId::Docx | EncoderId::Pptx | EncoderId::Xlsx
                | EncoderId::Doc | EncoderId::Ppt | EncoderId::Xls
                | EncoderId::Zip | EncoderId::Gz | EncoderId::Tgz
        )
    }

    /// Run the encoder.
    pub fn encode(self, budget: usize) -> Result<Vec<u8>, EncodeError> {
        match self {
            EncoderId::Plain => Ok(text::plain(budget)),
            EncoderId::Json  => text::json(budget),
            EncoderId::Csv   => Ok(text::csv(budget)),
            EncoderId::Xml   => Ok(text::xml(budget)),
            EncoderId::Html  => Ok(text::html(budget)),
            EncoderId::Svg   => Ok(text::svg(budget)),
            EncoderId::Rtf   => Ok(text::rtf(budget)),
            EncoderId::Png   => raster::png::encode(budget),
            EncoderId::Jpeg  => raster::jpeg::encode(budget),
            EncoderId::Webp  => raster::webp::encode(budget),
            EncoderId::Gif   => raster::gif::encode(budget),
            EncoderId::Bmp   => raster::bmp::encode(budget),
            EncoderId::Ico   => raster::ico::encode(budget),
            EncoderId::Tiff  => raster::tiff::encode(budget),
            EncoderId::Wav   => audio::wav(budget),
            EncoderId::Ogg   => audio::ogg(budget),
            EncoderId::Flac  => audio::flac(budget),
            EncoderId::M4a   => video::bmff::encode(video::bmff::Flavor::M4a, budget),
            EncoderId::Mp4   => video::bmff::encode(video::bmff::Flavor::Mp4, budget),
            EncoderId::Mov   => video::bmff::encode(video::bmff::Flavor::Mov, budget),
            EncoderId::Gifv  => video::bmff::encode(video::bmff::Flavor::Mp4, budget),
            EncoderId::Avi   => video::avi::encode(budget),
            EncoderId::Webm  => video::matroska::encode(video::matroska::DocType::Webm, budget),
            EncoderId::Mkv   => video::matroska::encode(video::matroska::DocType::Matroska, budget),
            EncoderId::Pdf   => document::pdf::encode(budget),
            EncoderId::Docx  => document::ooxml::encode(document::ooxml::Kind::Docx, budget),
            EncoderId::Pptx  => document::ooxml::encode(document::ooxml::Kind::Pptx, budget),
            EncoderId::Xlsx  => document::ooxml::encode(document::ooxml::Kind::Xlsx, budget),
            EncoderId::Doc   => document::ole::encode(document::ole::Kind::Doc, budget),
            EncoderId::Ppt   => document::ole::encode(document::ole::Kind::Ppt, budget),
            EncoderId::Xls   => document::ole::encode(document::ole::Kind::Xls, budget),
            EncoderId::Zip   => archive::zip(budget),
            EncoderId::Tar   => archive::tar(budget),
            EncoderId::Gz    => archive::gz(budget),
            EncoderId::Tgz   => archive::tgz(budget),
        }
    }
}

impl FormatEncoder for EncoderId {
    fn name(&self) -> &str { EncoderId::name(*self) }
    fn encode(&self, budget: usize) -> Result<Vec<u8>, EncodeError> { EncoderId::encode(*self, budget) }
    fn is_blocking(&self) -> bool { EncoderId::is_blocking(*self) }
}
