//! Runtime configuration, loaded from TOML.
//!
//! Every field is optional; missing ones fall back to the canonical
//! defaults. All axis numbers are fixed-point units (10_000 == 1.0).
//!
//! ```toml
//! snapshot_interval = 5
//!
//! [calibration]
//! initial_doom = 1500
//! path_lower_bound = 1000
//!
//! [bands]
//! caution = 2500
//! danger = 5000
//! catastrophe = 7500
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use narrow_path_engine::domain::Calibration;
use narrow_path_engine::error::InvariantViolation;
use narrow_path_engine::invariants::validate_calibration;

use crate::readout::BandThresholds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid calibration: {0}")]
    Calibration(#[from] InvariantViolation),
    #[error("band thresholds must be strictly increasing within (0, 10000]")]
    Bands,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub calibration: Calibration,
    pub bands: BandThresholds,
    /// Snapshot every N accepted events; 0 disables snapshots.
    pub snapshot_interval: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            bands: BandThresholds::default(),
            snapshot_interval: 10,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded runtime config");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no runtime config, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_calibration(&self.calibration)?;
        if !self.bands.is_ordered() {
            return Err(ConfigError::Bands);
        }
        Ok(())
    }
}
