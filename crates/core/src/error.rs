//! Error types for the curlflow core.

use thiserror::Error;

/// Errors produced while configuring or driving a simulation kernel.
#[derive(Debug, Error)]
pub enum SimError {
    /// Grid width or height was zero, their product overflowed, or a cell
    /// vector did not match the grid size.
    #[error("invalid dimensions: width and height must be non-zero and match the cell count")]
    InvalidDimensions,

    /// Damping must lie in (0, 1].
    #[error("invalid damping {0}: must be in (0, 1]")]
    InvalidDamping(f64),

    /// The delta-time ceiling must be finite and positive.
    #[error("invalid max_dt {0}: must be finite and greater than zero")]
    InvalidMaxDt(f64),

    /// Any other configuration value outside its accepted range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A per-tick input could not be applied (non-finite time or pointer).
    #[error("invalid tick input: {0}")]
    InvalidTickInput(String),

    /// Reading or writing a snapshot or run spec failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Shorthand for [`SimError::InvalidParameter`].
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Serialization(e.to_string())
    }
}
