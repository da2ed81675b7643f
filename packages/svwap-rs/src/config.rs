//! User-facing options, loaded from host settings panels as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted range for both deviation multipliers.
pub const DEVIATIONS_MIN: f64 = 0.1;
pub const DEVIATIONS_MAX: f64 = 10.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} out of range: {value} (expected {min}..={max})", min = DEVIATIONS_MIN, max = DEVIATIONS_MAX)]
    DeviationOutOfRange { name: &'static str, value: f64 },
    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Indicator options. JSON keys are camelCase, matching the names host
/// panels serialize (`deviations1`, `showInnerBand`, ...); missing keys
/// fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VwapConfig {
    /// Multiplier for the inner band, in sigmas.
    pub deviations1: f64,
    /// Multiplier for the outer band, in sigmas.
    pub deviations2: f64,
    pub show_inner_band: bool,
    pub show_outer_band: bool,
    /// When false the sums keep growing across session boundaries.
    pub reset_on_new_session: bool,
    /// Typical price (H+L+C)/3 when true, close otherwise.
    pub use_typical_price: bool,
}

impl Default for VwapConfig {
    fn default() -> Self {
        Self {
            deviations1: 1.0,
            deviations2: 2.0,
            show_inner_band: true,
            show_outer_band: true,
            reset_on_new_session: true,
            use_typical_price: true,
        }
    }
}

impl VwapConfig {
    /// Parses and validates a settings JSON object.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range check for the deviation multipliers. The engine itself never
    /// rejects a config (out-of-range multipliers just scale the bands);
    /// ingestion layers call this to surface typos early. A NaN multiplier
    /// fails the check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("deviations1", self.deviations1),
            ("deviations2", self.deviations2),
        ] {
            if !(DEVIATIONS_MIN..=DEVIATIONS_MAX).contains(&value) {
                return Err(ConfigError::DeviationOutOfRange { name, value });
            }
        }
        Ok(())
    }
}
