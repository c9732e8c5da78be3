//! Error types for vizij-motion-core.
//!
//! Resolution and playback never fail; these errors only surface where text
//! or JSON input is parsed into curves, durations or configuration.

use serde::{Deserialize, Serialize};

/// Error raised while parsing motion inputs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionError {
    /// Easing curve text could not be parsed
    #[error("Invalid easing curve '{input}': {reason}")]
    InvalidCurve { input: String, reason: String },

    /// Duration text could not be parsed
    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    /// Configuration value out of range
    #[error("Invalid config field {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl MotionError {
    pub(crate) fn curve(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCurve {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn duration(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if the caller can fall back to a default and carry on
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidCurve { .. } | Self::InvalidDuration { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidCurve { .. } => "curve",
            Self::InvalidDuration { .. } => "duration",
            Self::InvalidConfig { .. } => "config",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}
