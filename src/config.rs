//! Tester configuration.
//!
//! All fields have defaults, so an empty TOML document is a valid config:
//!
//! ```toml
//! max_fps = 60
//! history_seconds = 5
//!
//! [calibration]
//! near_full_fraction = 0.05
//! symmetric_tolerance = 0.001
//! extreme_margin_percent = 1
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TesterConfig {
    /// Frame rate the presentation loop is capped at.
    #[serde(default = "default_max_fps")]
    pub max_fps: u32,

    /// Seconds of axis history kept per axis.
    #[serde(default = "default_history_seconds")]
    pub history_seconds: u32,

    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// Thresholds used by the calibration engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Fraction of the declared range within which a seen extreme counts as
    /// "near" the declared extreme.
    #[serde(default = "default_near_full_fraction")]
    pub near_full_fraction: f64,

    /// Maximum deviation of `|max / min|` from 1 for a range to be treated as
    /// symmetric about zero.
    #[serde(default = "default_symmetric_tolerance")]
    pub symmetric_tolerance: f64,

    /// Whole percent a non-extreme reading is kept away from 0% / 100%.
    #[serde(default = "default_extreme_margin_percent")]
    pub extreme_margin_percent: i32,
}

/// Upper bound on samples kept per axis.
pub const MAX_HISTORY_CAPACITY: usize = 1 << 20;

fn default_max_fps() -> u32 {
    60
}

fn default_history_seconds() -> u32 {
    5
}

fn default_near_full_fraction() -> f64 {
    0.05
}

fn default_symmetric_tolerance() -> f64 {
    0.001
}

fn default_extreme_margin_percent() -> i32 {
    1
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            max_fps: default_max_fps(),
            history_seconds: default_history_seconds(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0..=50).contains(&self.extreme_margin_percent) {
            return Err(Error::InvalidConfig(format!(
                "extreme_margin_percent {} must be in 0..=50",
                self.extreme_margin_percent
            )));
        }
        for (name, value) in [
            ("near_full_fraction", self.near_full_fraction),
            ("symmetric_tolerance", self.symmetric_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} {value} must be a finite non-negative number"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            near_full_fraction: default_near_full_fraction(),
            symmetric_tolerance: default_symmetric_tolerance(),
            extreme_margin_percent: default_extreme_margin_percent(),
        }
    }
}

impl TesterConfig {
    /// Number of samples kept in each axis history buffer.
    pub fn history_capacity(&self) -> usize {
        (self.max_fps as usize).saturating_mul(self.history_seconds as usize)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make sampling misbehave.
    pub fn validate(&self) -> Result<()> {
        let capacity = self.history_capacity();
        if capacity == 0 || capacity > MAX_HISTORY_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "history capacity {capacity} (max_fps * history_seconds) must be in 1..={MAX_HISTORY_CAPACITY}"
            )));
        }
        self.calibration.validate()
    }

    /// Load from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_toml_str(&text)?;
        log::debug!(
            "loaded config from {} (history capacity {})",
            path.as_ref().display(),
            cfg.history_capacity()
        );
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = TesterConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, TesterConfig::default());
        assert_eq!(cfg.history_capacity(), 300);
    }

    #[test]
    fn partial_calibration_table() {
        let cfg = TesterConfig::from_toml_str(
            "max_fps = 30\n[calibration]\nnear_full_fraction = 0.1\n",
        )
        .unwrap();
        assert_eq!(cfg.max_fps, 30);
        assert_eq!(cfg.history_capacity(), 150);
        assert_eq!(cfg.calibration.near_full_fraction, 0.1);
        assert_eq!(cfg.calibration.extreme_margin_percent, 1);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for doc in [
            "[calibration]\nextreme_margin_percent = 60\n",
            "[calibration]\nextreme_margin_percent = -1\n",
            "[calibration]\nnear_full_fraction = -0.1\n",
            "[calibration]\nsymmetric_tolerance = nan\n",
            "max_fps = 0\n",
            "max_fps = 100000\nhistory_seconds = 100000\n",
        ] {
            let err = TesterConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, crate::Error::InvalidConfig(_)), "{doc}: {err}");
        }
    }

    #[test]
    fn boundary_margin_is_accepted() {
        let cfg = TesterConfig::from_toml_str("[calibration]\nextreme_margin_percent = 50\n").unwrap();
        assert_eq!(cfg.calibration.extreme_margin_percent, 50);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = TesterConfig::from_toml_str("max_fps = \"fast\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
