//! Megabyte-to-byte conversion.
//!
//! A budget is computed once per request and then threaded, unchanged,
//! through every encoder. Conversion always floors, so a fractional
//! request never rounds up past what the caller asked for.

use serde::{Deserialize, Serialize};

/// Bytes in one binary megabyte (MiB).
pub const BINARY_MB:  u64 = 1_048_576;
/// Bytes in one decimal megabyte (MB).
pub const DECIMAL_MB: u64 = 1_000_000;

/// Exact number of bytes an encoder must produce.
pub type ByteBudget = u64;

/// Which megabyte the caller means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    Binary,
    Decimal,
    /// Decimal on Apple platforms, binary everywhere else.
    Auto,
}

impl UnitMode {
    pub fn name(self) -> &'static str {
        match self {
            UnitMode::Binary  => "binary",
            UnitMode::Decimal => "decimal",
            UnitMode::Auto    => "auto",
        }
    }

    /// Parse from a CLI string.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "binary" | "mib" | "iec" => Some(UnitMode::Binary),
            "decimal" | "mb" | "si"  => Some(UnitMode::Decimal),
            "auto"                   => Some(UnitMode::Auto),
            _                        => None,
        }
    }
}

/// Host platform family, only consulted for [`UnitMode::Auto`].
///
/// The engine never probes the environment; the value is injected through
/// `EngineOptions` by whoever hosts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Apple,
    #[default]
    Other,
}

impl Platform {
    /// Platform of the compile target. Meant for binaries, not the engine.
    pub fn detect() -> Self {
        if cfg!(target_vendor = "apple") { Platform::Apple } else { Platform::Other }
    }
}

/// Bytes per megabyte under `unit` on `platform`.
pub fn bytes_per_mb(unit: UnitMode, platform: Platform) -> u64 {
    match (unit, platform) {
        (UnitMode::Binary, _)               => BINARY_MB,
        (UnitMode::Decimal, _)              => DECIMAL_MB,
        (UnitMode::Auto, Platform::Apple)   => DECIMAL_MB,
        (UnitMode::Auto, Platform::Other)   => BINARY_MB,
    }
}

/// `floor(size_mb * bytes_per_mb)`. Negative, NaN and infinite sizes map to 0.
pub fn convert(size_mb: f64, unit: UnitMode, platform: Platform) -> ByteBudget {
    if !size_mb.is_finite() || size_mb <= 0.0 {
        return 0;
    }
    // `as` saturates at u64::MAX for out-of-range floats.
    (size_mb * bytes_per_mb(unit, platform) as f64).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn whole_megabytes() {
        assert_eq!(convert(1.0, UnitMode::Decimal, Platform::Other), 1_000_000);
        assert_eq!(convert(1.0, UnitMode::Binary, Platform::Apple), 1_048_576);
        assert_eq!(convert(5.0, UnitMode::Binary, Platform::Other), 5_242_880);
    }

    #[test]
    fn zero_and_degenerate_input() {
        for unit in [UnitMode::Binary, UnitMode::Decimal, UnitMode::Auto] {
            assert_eq!(convert(0.0, unit, Platform::Other), 0);
            assert_eq!(convert(-3.0, unit, Platform::Other), 0);
            assert_eq!(convert(f64::NAN, unit, Platform::Apple), 0);
            assert_eq!(convert(f64::INFINITY, unit, Platform::Apple), 0);
        }
    }

    #[test]
    fn auto_follows_platform() {
        assert_eq!(convert(1.0, UnitMode::Auto, Platform::Apple), DECIMAL_MB);
        assert_eq!(convert(1.0, UnitMode::Auto, Platform::Other), BINARY_MB);
    }

    #[test]
    fn fractions_floor() {
        assert_eq!(convert(0.001, UnitMode::Decimal, Platform::Other), 1000);
        assert_eq!(convert(0.0005, UnitMode::Binary, Platform::Other), 524);
        // 1.5 MiB is exact, 1e-7 MB is a tenth of a byte.
        assert_eq!(convert(1.5, UnitMode::Binary, Platform::Other), 1_572_864);
        assert_eq!(convert(0.0000001, UnitMode::Decimal, Platform::Other), 0);
    }

    #[test]
    fn unit_names_roundtrip() {
        for unit in [UnitMode::Binary, UnitMode::Decimal, UnitMode::Auto] {
            assert_eq!(UnitMode::from_name(unit.name()), Some(unit));
        }
        assert_eq!(UnitMode::from_name("MiB"), Some(UnitMode::Binary));
        assert_eq!(UnitMode::from_name("furlongs"), None);
    }

    proptest! {
        #[test]
        fn never_exceeds_exact_product(mb in 0.0f64..1000.0) {
            let b = convert(mb, UnitMode::Decimal, Platform::Other);
            prop_assert!(b as f64 <= mb * DECIMAL_MB as f64);
            prop_assert!((b + 1) as f64 > mb * DECIMAL_MB as f64);
        }

        #[test]
        fn binary_is_never_smaller(mb in 0.0f64..1000.0) {
            prop_assert!(
                convert(mb, UnitMode::Binary, Platform::Other)
                    >= convert(mb, UnitMode::Decimal, Platform::Other)
            );
        }
    }
}
