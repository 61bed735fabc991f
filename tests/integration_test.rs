use dummyforge::container::bmff;
use dummyforge::corrupt::MARKER;
use dummyforge::registry::OCTET_STREAM;
use dummyforge::{convert, Engine, EngineOptions, GenerationRequest, Platform, Registry, UnitMode};
use flate2::read::GzDecoder;
use proptest::prelude::*;
use std::io::{Cursor, Read};
use tempfile::NamedTempFile;

fn request(extension: &str, size_mb: f64, unit: UnitMode, corrupt: bool) -> GenerationRequest {
    GenerationRequest { extension: extension.to_string(), size_mb, unit, corrupt }
}

async fn generate(extension: &str, size_mb: f64, unit: UnitMode, corrupt: bool) -> (Vec<u8>, String) {
    let file = Engine::standard().generate(&request(extension, size_mb, unit, corrupt)).await.unwrap();
    (file.bytes, file.mime_type)
}

#[tokio::test]
async fn test_json_thousand_bytes() {
    let (bytes, mime) = generate(".json", 0.001, UnitMode::Decimal, false).await;
    assert_eq!(bytes.len(), 1000);
    assert_eq!(mime, "application/json");
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(value.is_object());
}

#[tokio::test]
async fn test_tar_below_skeleton() {
    let (bytes, _) = generate(".tar", 0.0005, UnitMode::Binary, false).await;
    assert_eq!(bytes.len(), 1536);
    let mut archive = tar::Archive::new(Cursor::new(bytes));
    let entries: Vec<_> = archive.entries().unwrap().map(|e| e.unwrap().size()).collect();
    assert_eq!(entries, vec![0]);
}

#[tokio::test]
async fn test_tar_readable_with_odd_budget() {
    let (bytes, _) = generate(".tar", 0.01, UnitMode::Decimal, false).await;
    assert_eq!(bytes.len(), 10_000);
    let mut archive = tar::Archive::new(Cursor::new(bytes));
    let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
    assert_eq!(entry.path().unwrap().to_str(), Some("dummy.bin"));
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    assert_eq!(data.len() % 512, 0);
    assert!(data.iter().enumerate().all(|(i, &b)| b == (i % 256) as u8));
}

#[tokio::test]
async fn test_gz_one_binary_megabyte() {
    let (bytes, mime) = generate(".gz", 1.0, UnitMode::Auto, false).await;
    assert_eq!(bytes.len(), 1_048_576);
    assert_eq!(mime, "application/gzip");
    assert_eq!(&bytes[..2], &[0x1F, 0x8B]);

    // GzDecoder verifies the trailer CRC-32 and ISIZE.
    let mut payload = Vec::new();
    GzDecoder::new(&bytes[..]).read_to_end(&mut payload).unwrap();
    assert!(!payload.is_empty());
}

#[tokio::test]
async fn test_mp4_chunk_offset() {
    let (bytes, mime) = generate(".mp4", 2.0, UnitMode::Decimal, false).await;
    assert_eq!(bytes.len(), 2_000_000);
    assert_eq!(mime, "video/mp4");
    assert_eq!(&bytes[4..8], b"ftyp");

    let ftyp = bmff::find(&bytes, &[b"ftyp"]).unwrap();
    let moov = bmff::find(&bytes, &[b"moov"]).unwrap();
    let stco = bmff::find(&bytes, &[b"moov", b"trak", b"mdia", b"minf", b"stbl", b"stco"]).unwrap();
    let at = stco.payload().start + 8;
    let offset = u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize;
    assert_eq!(offset, ftyp.size + moov.size + 8);
}

#[tokio::test]
async fn test_unknown_extension_is_zeros() {
    let (bytes, mime) = generate(".anything-unknown", 5.0, UnitMode::Binary, false).await;
    assert_eq!(bytes.len(), 5_242_880);
    assert!(bytes.iter().all(|&b| b == 0));
    assert_eq!(mime, OCTET_STREAM);
}

#[tokio::test]
async fn test_corrupt_png() {
    let (bytes, mime) = generate(".png", 1.0, UnitMode::Binary, true).await;
    assert_eq!(bytes.len(), 1_048_576);
    assert!(bytes.starts_with(MARKER));
    assert_eq!(mime, "image/png");
}

#[tokio::test]
async fn test_zip_readable() {
    let (bytes, _) = generate(".zip", 0.05, UnitMode::Decimal, false).await;
    assert_eq!(bytes.len(), 50_000);
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 1);
}

#[tokio::test]
async fn test_every_structured_extension_is_exact() {
    let engine = Engine::standard();
    let budget = 300_000;
    for ext in engine.registry().extensions() {
        let file = engine.generate_bytes(ext, budget, false).await.unwrap();
        assert_eq!(file.bytes.len() as u64, budget, "{ext}");
        assert_eq!(file.mime_type, engine.mime_type(ext));
    }
}

#[tokio::test]
async fn test_zero_budget_never_fails() {
    let engine = Engine::standard();
    for ext in engine.registry().extensions() {
        let file = engine.generate_bytes(ext, 0, false).await.unwrap();
        if !engine.is_structured_format(ext) {
            assert!(file.bytes.is_empty(), "{ext}");
        }
    }
}

#[tokio::test]
async fn test_idempotent_length_and_mime() {
    let engine = Engine::standard();
    for ext in [".tar", ".pdf", ".docx", ".webm"] {
        let req = request(ext, 0.2, UnitMode::Decimal, false);
        let a = engine.generate(&req).await.unwrap();
        let b = engine.generate(&req).await.unwrap();
        assert_eq!(a.bytes.len(), b.bytes.len(), "{ext}");
        assert_eq!(a.mime_type, b.mime_type);
    }
}

#[tokio::test]
async fn test_write_and_reread() {
    let engine = Engine::new(Registry::standard(), EngineOptions { platform: Platform::Apple, ..Default::default() });
    let file = engine.generate(&request("WAV", 0.25, UnitMode::Auto, false)).await.unwrap();
    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), &file.bytes).unwrap();
    let back = std::fs::read(temp.path()).unwrap();
    assert_eq!(back.len(), 250_000);
    assert_eq!(&back[..4], b"RIFF");
    assert_eq!(&back[8..12], b"WAVE");
}

#[test]
fn test_convert_fixed_points() {
    for p in [Platform::Apple, Platform::Other] {
        assert_eq!(convert(1.0, UnitMode::Decimal, p), 1_000_000);
        assert_eq!(convert(1.0, UnitMode::Binary, p), 1_048_576);
        assert_eq!(convert(0.0, UnitMode::Auto, p), 0);
    }
}

proptest! {
    #[test]
    fn prop_convert_floors(size in 0.0f64..4096.0) {
        let n = convert(size, UnitMode::Binary, Platform::Other);
        prop_assert!((n as f64) <= size * 1_048_576.0);
        prop_assert!((n as f64) > size * 1_048_576.0 - 1.0);
    }

    #[test]
    fn prop_decimal_never_exceeds_binary(size in 0.0f64..4096.0) {
        prop_assert!(convert(size, UnitMode::Decimal, Platform::Other) <= convert(size, UnitMode::Binary, Platform::Other));
    }
}
