//! Extension → format descriptor table.
//!
//! ```rust
//! use dummyforge::formats::EncoderId;
//! use dummyforge::registry::Registry;
//!
//! let reg = Registry::builder()
//!     .structured(".png", "image/png", EncoderId::Png)
//!     .binary_only(".rar", "application/x-rar-compressed")
//!     .build();
//! assert!(reg.is_structured("PNG"));
//! assert!(!reg.is_structured(".rar"));
//! assert_eq!(reg.mime_type(".unknown"), "application/octet-stream");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::formats::{EncodeError, EncoderId, FormatEncoder};

pub const OCTET_STREAM: &str = "application/octet-stream";

// ── Encoder ──────────────────────────────────────────────────────────────────

/// A built-in encoder or a caller-supplied one.
#[derive(Clone)]
pub enum Encoder {
    Builtin(EncoderId),
    Custom(Arc<dyn FormatEncoder>),
}

impl Encoder {
    pub fn name(&self) -> &str {
        match self {
            Encoder::Builtin(id) => id.name(),
            Encoder::Custom(c)   => c.name(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        match self {
            Encoder::Builtin(id) => id.is_blocking(),
            Encoder::Custom(c)   => c.is_blocking(),
        }
    }

    pub fn encode(&self, budget: usize) -> Result<Vec<u8>, EncodeError> {
        match self {
            Encoder::Builtin(id) => id.encode(budget),
            Encoder::Custom(c)   => c.encode(budget),
        }
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoder::Builtin(id) => write!(f, "Builtin({})", id.name()),
            Encoder::Custom(c)   => write!(f, "Custom({})", c.name()),
        }
    }
}

// ── FormatDescriptor ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FormatDescriptor {
    /// Lowercase, with leading dot.
    pub extension: String,
    pub mime_type: String,
    pub encoder:   Option<Encoder>,
}

impl FormatDescriptor {
    pub fn has_structured_encoder(&self) -> bool {
        self.encoder.is_some()
    }
}

/// `"PNG"`, `".png"` and `" .Png "` all become `".png"`.
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    format!(".{}", bare.to_lowercase())
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<FormatDescriptor>,
    by_ext:      HashMap<String, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Every extension the generator knows, with its MIME type.
    pub fn standard() -> Self {
        use EncoderId as E;
        Registry::builder()
            // images
            .structured(".png",  "image/png",     E::Png)
            .structured(".jpg",  "image/jpeg",    E::Jpeg)
            .structured(".jpeg", "image/jpeg",    E::Jpeg)
            .structured(".webp", "image/webp",    E::Webp)
            .structured(".gif",  "image/gif",     E::Gif)
            .structured(".svg",  "image/svg+xml", E::Svg)
            .structured(".bmp",  "image/bmp",     E::Bmp)
            .structured(".ico",  "image/x-icon",  E::Ico)
            .structured(".tiff", "image/tiff",    E::Tiff)
            .structured(".tif",  "image/tiff",    E::Tiff)
            // video
            .structured(".mp4",  "video/mp4",        E::Mp4)
            .structured(".mov",  "video/quicktime",  E::Mov)
            .structured(".avi",  "video/x-msvideo",  E::Avi)
            .structured(".webm", "video/webm",       E::Webm)
            .structured(".mkv",  "video/x-matroska", E::Mkv)
            .structured(".gifv", "video/mp4",        E::Gifv)
            .binary_only(".wmv", "video/x-ms-wmv")
            .binary_only(".flv", "video/x-flv")
            // audio
            .structured(".wav",  "audio/wav",  E::Wav)
            .structured(".ogg",  "audio/ogg",  E::Ogg)
            .structured(".m4a",  "audio/mp4",  E::M4a)
            .structured(".flac", "audio/flac", E::Flac)
            .binary_only(".mp3", "audio/mpeg")
            .binary_only(".aac", "audio/aac")
            .binary_only(".wma", "audio/x-ms-wma")
            // documents
            .structured(".pdf",  "application/pdf", E::Pdf)
            .structured(".doc",  "application/msword", E::Doc)
            .structured(".docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document", E::Docx)
            .structured(".ppt",  "application/vnd.ms-powerpoint", E::Ppt)
            .structured(".pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation", E::Pptx)
            .structured(".xls",  "application/vnd.ms-excel", E::Xls)
            .structured(".xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", E::Xlsx)
            .structured(".txt",  "text/plain",      E::Plain)
            .structured(".md",   "text/markdown",   E::Plain)
            .structured(".rtf",  "application/rtf", E::Rtf)
            // data
            .structured(".json", "application/json",       E::Json)
            .structured(".csv",  "text/csv",               E::Csv)
            .structured(".xml",  "application/xml",        E::Xml)
            .structured(".sql",  "text/plain",             E::Plain)
            .structured(".yaml", "text/yaml",              E::Plain)
            .structured(".html", "text/html",              E::Html)
            .structured(".css",  "text/css",               E::Plain)
            .structured(".js",   "application/javascript", E::Plain)
            // archives
            .structured(".zip", "application/zip",   E::Zip)
            .structured(".tar", "application/x-tar", E::Tar)
            .structured(".gz",  "application/gzip",  E::Gz)
            .structured(".tgz", "application/gzip",  E::Tgz)
            .binary_only(".rar", "application/x-rar-compressed")
            .binary_only(".7z",  "application/x-7z-compressed")
            .binary_only(".iso", "application/x-iso9660-image")
            .binary_only(".dmg", "application/x-apple-diskimage")
            .build()
    }

    /// Case-insensitive lookup; the leading dot is optional.
    pub fn lookup(&self, ext: &str) -> Option<&FormatDescriptor> {
        self.by_ext.get(&normalize_extension(ext)).map(|&i| &self.descriptors[i])
    }

    pub fn is_structured(&self, ext: &str) -> bool {
        self.lookup(ext).is_some_and(FormatDescriptor::has_structured_encoder)
    }

    /// MIME type for `ext`, or `application/octet-stream` when unknown.
    pub fn mime_type(&self, ext: &str) -> &str {
        self.lookup(ext).map_or(OCTET_STREAM, |d| d.mime_type.as_str())
    }

    /// Extensions in registration order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.extension.as_str())
    }

    pub fn descriptors(&self) -> &[FormatDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

// ── RegistryBuilder ──────────────────────────────────────────────────────────

/// Registering an extension twice keeps the later entry in the earlier slot.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    fn insert(mut self, ext: &str, mime: &str, encoder: Option<Encoder>) -> Self {
        let extension = normalize_extension(ext);
        let desc = FormatDescriptor { extension: extension.clone(), mime_type: mime.to_string(), encoder };
        let reg = &mut self.registry;
        match reg.by_ext.get(&extension) {
            Some(&i) => reg.descriptors[i] = desc,
            None => {
                reg.by_ext.insert(extension, reg.descriptors.len());
                reg.descriptors.push(desc);
            }
        }
        self
    }

    pub fn structured(self, ext: &str, mime: &str, id: EncoderId) -> Self {
        self.insert(ext, mime, Some(Encoder::Builtin(id)))
    }

    pub fn binary_only(self, ext: &str, mime: &str) -> Self {
        self.insert(ext, mime, None)
    }

    pub fn custom(self, ext: &str, mime: &str, encoder: Arc<dyn FormatEncoder>) -> Self {
        self.insert(ext, mime, Some(Encoder::Custom(encoder)))
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl FormatEncoder for Fixed {
        fn name(&self) -> &str { "fixed" }
        fn encode(&self, budget: usize) -> Result<Vec<u8>, EncodeError> { Ok(vec![7; budget]) }
    }

    #[test]
    fn lookup_is_forgiving() {
        let reg = Registry::standard();
        for ext in ["png", ".png", "PNG", ".PnG", " .png "] {
            assert_eq!(reg.lookup(ext).unwrap().extension, ".png");
        }
        assert!(reg.lookup(".nope").is_none());
        assert_eq!(reg.mime_type("nope"), OCTET_STREAM);
    }

    #[test]
    fn standard_table() {
        let reg = Registry::standard();
        assert_eq!(reg.mime_type(".gz"), "application/gzip");
        assert_eq!(reg.mime_type(".gifv"), "video/mp4");
        assert!(reg.is_structured(".tgz"));
        for ext in [".mp3", ".aac", ".wma", ".wmv", ".flv", ".rar", ".7z", ".iso", ".dmg"] {
            assert!(reg.lookup(ext).is_some(), "{ext}");
            assert!(!reg.is_structured(ext), "{ext}");
        }
        let mut exts: Vec<_> = reg.extensions().collect();
        let n = exts.len();
        exts.sort_unstable();
        exts.dedup();
        assert_eq!(exts.len(), n);
    }

    #[test]
    fn every_builtin_is_registered() {
        let reg = Registry::standard();
        for id in EncoderId::ALL {
            assert!(
                reg.descriptors().iter().any(|d| matches!(d.encoder, Some(Encoder::Builtin(b)) if b == id)),
                "{} has no extension",
                id.name()
            );
        }
    }

    #[test]
    fn custom_encoders_and_overrides() {
        let reg = Registry::builder()
            .binary_only("bin", "application/x-one")
            .custom(".BIN", "application/x-two", Arc::new(Fixed))
            .build();
        assert_eq!(reg.len(), 1);
        let d = reg.lookup("bin").unwrap();
        assert_eq!(d.mime_type, "application/x-two");
        let enc = d.encoder.as_ref().unwrap();
        assert_eq!(enc.name(), "fixed");
        assert!(!enc.is_blocking());
        assert_eq!(enc.encode(3).unwrap(), vec![7, 7, 7]);
    }
}
