use clap::{Parser, Subcommand};
use dummyforge::{Engine, EngineOptions, GenerationRequest, Platform, Registry, UnitMode};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dummyforge", about = "Size-exact dummy file generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a dummy file of an exact size
    Generate {
        /// Target extension, e.g. .png or mp4
        #[arg(short, long)]
        extension: String,
        /// Size in megabytes
        #[arg(short, long)]
        size: f64,
        /// Megabyte flavour: binary, decimal or auto
        #[arg(short, long, default_value = "auto")]
        unit: String,
        /// Emit a marker-prefixed corrupted file instead
        #[arg(long)]
        corrupt: bool,
        /// Output path (default: dummy<extension>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List known extensions
    Formats {
        #[arg(long)]
        json: bool,
    },
    /// Show size, leading bytes and BLAKE3 hash of a file
    Inspect {
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct FormatRow<'a> {
    extension:  &'a str,
    mime_type:  &'a str,
    structured: bool,
    encoder:    Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dummyforge=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {

        // ── Generate ─────────────────────────────────────────────────────────
        Commands::Generate { extension, size, unit, corrupt, output } => {
            let engine = Engine::new(
                Registry::standard(),
                EngineOptions { platform: Platform::detect(), ..Default::default() },
            );
            let request = GenerationRequest { extension, size_mb: size, unit: parse_unit(&unit), corrupt };
            let file = engine.generate(&request).await?;
            let path = output.unwrap_or_else(|| default_output(&request.extension));
            std::fs::write(&path, &file.bytes)?;
            println!("Created: {} ({} bytes, {})", path.display(), file.bytes.len(), file.mime_type);
        }

        // ── Formats ──────────────────────────────────────────────────────────
        Commands::Formats { json } => {
            let registry = Registry::standard();
            let rows: Vec<FormatRow> = registry
                .descriptors()
                .iter()
                .map(|d| FormatRow {
                    extension:  &d.extension,
                    mime_type:  &d.mime_type,
                    structured: d.has_structured_encoder(),
                    encoder:    d.encoder.as_ref().map(|e| e.name()),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<8} {:<12} {}", "Ext", "Encoder", "MIME type");
                for r in &rows {
                    println!("{:<8} {:<12} {}", r.extension, r.encoder.unwrap_or("(raw)"), r.mime_type);
                }
            }
        }

        // ── Inspect ──────────────────────────────────────────────────────────
        Commands::Inspect { input } => {
            let data = std::fs::read(&input)?;
            let head = &data[..data.len().min(16)];
            println!("── {} ─────────────────────────────────────────", input.display());
            println!("  Size    {} B", data.len());
            println!("  Head    {}", hex::encode(head));
            println!("  BLAKE3  {}", blake3::hash(&data).to_hex());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn parse_unit(s: &str) -> UnitMode {
    UnitMode::from_name(s).unwrap_or_else(|| {
        eprintln!("Unknown unit '{}', defaulting to auto", s);
        UnitMode::Auto
    })
}

fn default_output(extension: &str) -> PathBuf {
    Path::new(".").join(format!("dummy{}", dummyforge::registry::normalize_extension(extension)))
}
