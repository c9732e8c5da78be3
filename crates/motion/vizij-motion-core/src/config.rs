//! Driver tuning.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::resolve::DEFAULT_UNIT_SECS;
use crate::Result;

/// Configuration shared by drivers and host loops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds an untimed leaf lasts; also the base for top-level relative
    /// durations and for trees timed only in relative terms.
    pub default_duration_secs: f64,

    /// Tolerance for "target reached" comparisons.
    pub progress_epsilon: f64,

    /// Whole repeat-forever cycles whose side effects are replayed within a
    /// single advance. Further cycles are skipped.
    pub max_cycles_per_advance: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_UNIT_SECS,
            progress_epsilon: 1e-9,
            max_cycles_per_advance: 8,
        }
    }
}

impl Config {
    /// Parse from JSON (missing fields take their defaults) and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_duration_secs.is_finite() || self.default_duration_secs < 0.0 {
            return Err(MotionError::config(
                "default_duration_secs",
                format!("must be a finite, non-negative number, got {}", self.default_duration_secs),
            ));
        }
        if !self.progress_epsilon.is_finite() || self.progress_epsilon <= 0.0 {
            return Err(MotionError::config(
                "progress_epsilon",
                format!("must be positive, got {}", self.progress_epsilon),
            ));
        }
        if self.max_cycles_per_advance == 0 {
            return Err(MotionError::config(
                "max_cycles_per_advance",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
