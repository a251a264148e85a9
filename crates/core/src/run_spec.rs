//! Reproducible description of a headless simulation run.
//!
//! A [`RunSpec`] captures everything needed to replay a run: grid size,
//! parameter overrides, PRNG seed, tick count and fixed time step.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reproducible specification for a simulation run.
///
/// Two identical `RunSpec` values fed to the same binary produce
/// bit-identical particle state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSpec {
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_object")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub ticks: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_dt() -> f64 {
    RunSpec::DEFAULT_DT
}

impl RunSpec {
    /// Fixed step used when a spec does not name one: 60 ticks per second.
    pub const DEFAULT_DT: f64 = 1.0 / 60.0;

    /// Creates a spec with empty params, zero ticks and the default step.
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            params: empty_object(),
            seed,
            ticks: 0,
            dt: Self::DEFAULT_DT,
        }
    }

    /// Reads a spec from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Io(format!("{}: {e}", path.display())))?;
        let spec: RunSpec = serde_json::from_str(&text)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validates non-zero, non-overflowing dimensions, an object-valued
    /// `params` and a finite non-negative step.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(SimError::InvalidDimensions)?;
        if !self.params.is_object() {
            return Err(SimError::invalid("params", "must be a JSON object"));
        }
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(SimError::invalid("dt", format!("must be finite and >= 0, got {}", self.dt)));
        }
        Ok(())
    }
}
