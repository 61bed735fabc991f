//! Request dispatch.
//!
//! ```rust,no_run
//! use dummyforge::engine::{Engine, GenerationRequest};
//! use dummyforge::units::UnitMode;
//!
//! # async fn run() -> Result<(), dummyforge::engine::EngineError> {
//! let engine = Engine::standard();
//! let file = engine.generate(&GenerationRequest {
//!     extension: ".png".into(),
//!     size_mb:   1.5,
//!     unit:      UnitMode::Decimal,
//!     corrupt:   false,
//! }).await?;
//! assert_eq!(file.bytes.len(), 1_500_000);
//! # Ok(()) }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::corrupt;
use crate::reconcile::Fit;
use crate::registry::{Encoder, Registry, OCTET_STREAM};
use crate::units::{self, ByteBudget, Platform, UnitMode, BINARY_MB};

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Budget of {requested} bytes exceeds the limit of {limit} bytes")]
    BudgetTooLarge { requested: ByteBudget, limit: ByteBudget },
}

// ── EngineOptions ────────────────────────────────────────────────────────────

/// Configuration for [`Engine`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Consulted for [`UnitMode::Auto`] only.
    pub platform:   Platform,
    /// Requests above this are rejected before any allocation.
    pub max_budget: ByteBudget,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            platform:   Platform::Other,
            max_budget: 1000 * BINARY_MB,
        }
    }
}

// ── Request / response ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub extension: String,
    pub size_mb:   f64,
    pub unit:      UnitMode,
    #[serde(default)]
    pub corrupt:   bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub bytes:     Vec<u8>,
    pub mime_type: String,
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    options:  EngineOptions,
}

impl Engine {
    pub fn new(registry: Registry, options: EngineOptions) -> Self {
        Self::with_shared_registry(Arc::new(registry), options)
    }

    pub fn with_shared_registry(registry: Arc<Registry>, options: EngineOptions) -> Self {
        Self { registry, options }
    }

    /// Standard table, default options.
    pub fn standard() -> Self {
        Self::new(Registry::standard(), EngineOptions::default())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn byte_budget(&self, size_mb: f64, unit: UnitMode) -> ByteBudget {
        units::convert(size_mb, unit, self.options.platform)
    }

    pub fn is_structured_format(&self, extension: &str) -> bool {
        self.registry.is_structured(extension)
    }

    pub fn mime_type(&self, extension: &str) -> &str {
        self.registry.mime_type(extension)
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedFile, EngineError> {
        let budget = self.byte_budget(request.size_mb, request.unit);
        debug!(
            extension = %request.extension,
            size_mb = request.size_mb,
            unit = request.unit.name(),
            budget,
            "converted request size"
        );
        self.generate_bytes(&request.extension, budget, request.corrupt).await
    }

    /// Produce a file of exactly `budget` bytes, or the format's skeleton
    /// when that is larger.
    ///
    /// Encoder failures never surface: they are logged and replaced by
    /// `budget` zero bytes.
    pub async fn generate_bytes(
        &self,
        extension: &str,
        budget: ByteBudget,
        corrupt: bool,
    ) -> Result<GeneratedFile, EngineError> {
        let limit = self.options.max_budget;
        let n = usize::try_from(budget)
            .ok()
            .filter(|_| budget <= limit)
            .ok_or(EngineError::BudgetTooLarge { requested: budget, limit })?;

        let descriptor = self.registry.lookup(extension);
        let mime_type = descriptor.map_or(OCTET_STREAM, |d| d.mime_type.as_str()).to_string();

        if corrupt {
            debug!(extension, budget, "writing corrupted file");
            return Ok(GeneratedFile { bytes: corrupt::corrupt(n), mime_type });
        }

        let Some(encoder) = descriptor.and_then(|d| d.encoder.clone()) else {
            debug!(extension, budget, "no structured encoder, writing raw bytes");
            return Ok(GeneratedFile { bytes: vec![0; n], mime_type });
        };

        let bytes = match run(&encoder, n).await {
            Ok(bytes) => match Fit::of(bytes.len(), n) {
                Fit::Short => {
                    warn!(extension, encoder = encoder.name(), budget, len = bytes.len(), "encoder came up short, writing raw bytes");
                    vec![0; n]
                }
                fit => {
                    debug!(extension, encoder = encoder.name(), budget, len = bytes.len(), fit = fit.name(), "encoded");
                    bytes
                }
            },
            Err(reason) => {
                warn!(extension, encoder = encoder.name(), budget, %reason, "encoder failed, writing raw bytes");
                vec![0; n]
            }
        };
        Ok(GeneratedFile { bytes, mime_type })
    }
}

/// Run inline, or on the blocking pool for heavy encoders. A panic on the
/// blocking pool comes back as an error.
async fn run(encoder: &Encoder, budget: usize) -> Result<Vec<u8>, String> {
    if !encoder.is_blocking() {
        return encoder.encode(budget).map_err(|e| e.to_string());
    }
    let owned = encoder.clone();
    match tokio::task::spawn_blocking(move || owned.encode(budget)).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(join) => Err(join.to_string()),
    }
}
