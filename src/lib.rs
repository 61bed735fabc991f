pub mod units;
pub mod toolkit;
pub mod container;
pub mod reconcile;
pub mod corrupt;
pub mod formats;
pub mod registry;
pub mod engine;

pub use units::{convert, ByteBudget, Platform, UnitMode};
pub use formats::{EncodeError, EncoderId, FormatEncoder};
pub use registry::{FormatDescriptor, Registry};
pub use engine::{Engine, EngineError, EngineOptions, GeneratedFile, GenerationRequest};
