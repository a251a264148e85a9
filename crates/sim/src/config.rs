//! Construction-time configuration of a curl-flow simulation.

use crate::boundary::BoundaryPolicy;
use curlflow_core::error::SimError;
use curlflow_core::params::{param_f64, param_vec3};
use curlflow_core::SpawnVolume;
use serde_json::{json, Value};

/// Default grid width (particles per row).
const DEFAULT_GRID_WIDTH: usize = 128;
/// Default grid height (rows).
const DEFAULT_GRID_HEIGHT: usize = 128;
/// Default spatial frequency of the noise lookup.
const DEFAULT_NOISE_FREQUENCY: f64 = 0.1;
/// Default rate at which the noise evolves over time.
const DEFAULT_NOISE_TIME_SCALE: f64 = 0.1;
/// Default gain applied to the curl sample each tick.
const DEFAULT_NOISE_GAIN: f64 = 0.05;
/// Default vertical acceleration.
const DEFAULT_GRAVITY: f64 = -0.1;
/// Default per-tick velocity multiplier.
const DEFAULT_DAMPING: f64 = 0.99;
/// Default pointer attraction radius.
const DEFAULT_POINTER_RADIUS: f64 = 5.0;
/// Default pointer strength multiplier.
const DEFAULT_POINTER_STRENGTH: f64 = 1.0;
/// Default hard cap on particle speed.
const DEFAULT_MAX_SPEED: f64 = 10.0;
/// Default delta-time ceiling in seconds.
const DEFAULT_MAX_DT: f64 = 0.1;

/// Simulation parameters.
///
/// Owned by a [`Simulation`](crate::Simulation) and never changed after
/// construction. Use [`Default`] for a gently drifting 128×128 cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Particles per row. Particle count is `grid_width * grid_height`.
    pub grid_width: usize,
    /// Rows of particles.
    pub grid_height: usize,
    /// Scale applied to positions before sampling the noise.
    pub noise_frequency: f64,
    /// Scale applied to elapsed time before sampling the noise.
    pub noise_time_scale: f64,
    /// Multiplier on the curl sample added to velocity.
    pub noise_gain: f64,
    /// Acceleration along +y (negative pulls down).
    pub gravity: f64,
    /// Velocity multiplier per tick, in (0, 1].
    pub damping: f64,
    /// Pointer attraction only acts within this distance.
    pub pointer_radius: f64,
    /// Multiplies the per-tick pointer strength.
    pub pointer_strength: f64,
    /// Hard cap on `|velocity|`.
    pub max_speed: f64,
    /// Delta time is clamped to this before each tick.
    pub max_dt: f64,
    pub boundary: BoundaryPolicy,
    /// Where particles start and where broken cells are respawned.
    pub spawn: SpawnVolume,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            noise_frequency: DEFAULT_NOISE_FREQUENCY,
            noise_time_scale: DEFAULT_NOISE_TIME_SCALE,
            noise_gain: DEFAULT_NOISE_GAIN,
            gravity: DEFAULT_GRAVITY,
            damping: DEFAULT_DAMPING,
            pointer_radius: DEFAULT_POINTER_RADIUS,
            pointer_strength: DEFAULT_POINTER_STRENGTH,
            max_speed: DEFAULT_MAX_SPEED,
            max_dt: DEFAULT_MAX_DT,
            boundary: BoundaryPolicy::default(),
            spawn: SpawnVolume::default(),
        }
    }
}

impl SimulationConfig {
    /// Default config with the given grid size.
    pub fn with_grid(grid_width: usize, grid_height: usize) -> Self {
        Self {
            grid_width,
            grid_height,
            ..Self::default()
        }
    }

    /// Extracts a config from a JSON object, falling back to defaults for
    /// missing or mistyped keys, then validates it.
    ///
    /// Grid dimensions, `damping` and `max_dt` never fall back: if present
    /// they must be a positive integer (dimensions) or a number.
    ///
    /// `boundary` and `spawn` are nested objects; see
    /// [`BoundaryPolicy::from_json`] and the `spawn` entry of
    /// [`SimulationConfig::schema`].
    pub fn from_json(params: &Value) -> Result<Self, SimError> {
        let defaults = Self::default();
        let boundary = match params.get("boundary") {
            Some(b) => BoundaryPolicy::from_json(b)?,
            None => defaults.boundary,
        };
        let spawn = match params.get("spawn") {
            Some(s) => SpawnVolume {
                center: param_vec3(s, "center", defaults.spawn.center),
                half_extent: param_vec3(s, "half_extent", defaults.spawn.half_extent),
            },
            None => defaults.spawn,
        };
        let config = Self {
            grid_width: grid_dimension(params, "grid_width", DEFAULT_GRID_WIDTH)?,
            grid_height: grid_dimension(params, "grid_height", DEFAULT_GRID_HEIGHT)?,
            noise_frequency: param_f64(params, "noise_frequency", DEFAULT_NOISE_FREQUENCY),
            noise_time_scale: param_f64(params, "noise_time_scale", DEFAULT_NOISE_TIME_SCALE),
            noise_gain: param_f64(params, "noise_gain", DEFAULT_NOISE_GAIN),
            gravity: param_f64(params, "gravity", DEFAULT_GRAVITY),
            damping: number(params, "damping", DEFAULT_DAMPING)?,
            pointer_radius: param_f64(params, "pointer_radius", DEFAULT_POINTER_RADIUS),
            pointer_strength: param_f64(params, "pointer_strength", DEFAULT_POINTER_STRENGTH),
            max_speed: param_f64(params, "max_speed", DEFAULT_MAX_SPEED),
            max_dt: number(params, "max_dt", DEFAULT_MAX_DT)?,
            boundary,
            spawn,
        };
        config.validate()?;
        Ok(config)
    }

    /// Fails fast on anything that would yield a degenerate buffer or an
    /// unstable integrator.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SimError::InvalidDimensions);
        }
        self.grid_width
            .checked_mul(self.grid_height)
            .ok_or(SimError::InvalidDimensions)?;
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(SimError::InvalidDamping(self.damping));
        }
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            return Err(SimError::InvalidMaxDt(self.max_dt));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(SimError::invalid(
                "max_speed",
                format!("must be finite and > 0, got {}", self.max_speed),
            ));
        }
        if !(self.pointer_radius.is_finite() && self.pointer_radius >= 0.0) {
            return Err(SimError::invalid(
                "pointer_radius",
                format!("must be finite and >= 0, got {}", self.pointer_radius),
            ));
        }
        for (name, value) in [
            ("noise_frequency", self.noise_frequency),
            ("noise_time_scale", self.noise_time_scale),
            ("noise_gain", self.noise_gain),
            ("gravity", self.gravity),
            ("pointer_strength", self.pointer_strength),
        ] {
            if !value.is_finite() {
                return Err(SimError::invalid(name, format!("must be finite, got {value}")));
            }
        }
        self.boundary.validate()?;
        if !self.spawn.center.is_finite() {
            return Err(SimError::invalid("spawn.center", "must be finite"));
        }
        if !(self.spawn.half_extent.is_finite() && self.spawn.half_extent.min_element() >= 0.0) {
            return Err(SimError::invalid(
                "spawn.half_extent",
                "must be finite and >= 0 on every axis",
            ));
        }
        Ok(())
    }

    /// Number of particles.
    pub fn particle_count(&self) -> usize {
        self.grid_width * self.grid_height
    }

    /// Current values as a JSON object accepted by [`Self::from_json`].
    pub fn to_json(&self) -> Value {
        let c = self.spawn.center;
        let h = self.spawn.half_extent;
        json!({
            "grid_width": self.grid_width,
            "grid_height": self.grid_height,
            "noise_frequency": self.noise_frequency,
            "noise_time_scale": self.noise_time_scale,
            "noise_gain": self.noise_gain,
            "gravity": self.gravity,
            "damping": self.damping,
            "pointer_radius": self.pointer_radius,
            "pointer_strength": self.pointer_strength,
            "max_speed": self.max_speed,
            "max_dt": self.max_dt,
            "boundary": self.boundary.to_json(),
            "spawn": {
                "center": [c.x, c.y, c.z],
                "half_extent": [h.x, h.y, h.z],
            },
        })
    }

    /// Schema describing every key of [`Self::to_json`].
    pub fn schema() -> Value {
        json!({
            "grid_width": {
                "type": "integer",
                "default": DEFAULT_GRID_WIDTH,
                "min": 1,
                "description": "Particles per row; particle count is grid_width * grid_height"
            },
            "grid_height": {
                "type": "integer",
                "default": DEFAULT_GRID_HEIGHT,
                "min": 1,
                "description": "Rows of particles"
            },
            "noise_frequency": {
                "type": "number",
                "default": DEFAULT_NOISE_FREQUENCY,
                "min": 0.0,
                "max": 10.0,
                "description": "Spatial frequency of the curl-noise lookup"
            },
            "noise_time_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_TIME_SCALE,
                "min": 0.0,
                "max": 10.0,
                "description": "How fast the noise evolves with elapsed time"
            },
            "noise_gain": {
                "type": "number",
                "default": DEFAULT_NOISE_GAIN,
                "min": 0.0,
                "max": 5.0,
                "description": "Curl sample added to velocity each tick"
            },
            "gravity": {
                "type": "number",
                "default": DEFAULT_GRAVITY,
                "min": -50.0,
                "max": 50.0,
                "description": "Acceleration along +y; negative pulls down"
            },
            "damping": {
                "type": "number",
                "default": DEFAULT_DAMPING,
                "min": 0.0,
                "max": 1.0,
                "description": "Velocity multiplier per tick, in (0, 1]"
            },
            "pointer_radius": {
                "type": "number",
                "default": DEFAULT_POINTER_RADIUS,
                "min": 0.0,
                "max": 100.0,
                "description": "Pointer attraction acts within this distance"
            },
            "pointer_strength": {
                "type": "number",
                "default": DEFAULT_POINTER_STRENGTH,
                "min": -10.0,
                "max": 10.0,
                "description": "Multiplier on the per-tick pointer strength"
            },
            "max_speed": {
                "type": "number",
                "default": DEFAULT_MAX_SPEED,
                "min": 0.0,
                "description": "Hard cap on particle speed"
            },
            "max_dt": {
                "type": "number",
                "default": DEFAULT_MAX_DT,
                "min": 0.0,
                "max": 1.0,
                "description": "Delta time is clamped to this before each tick"
            },
            "boundary": {
                "type": "object",
                "default": BoundaryPolicy::default().to_json(),
                "description": "{\"mode\": \"wrap\", \"extent\"} or {\"mode\": \"respawn\", \"axis\", \"lower_bound\", \"reset\": [x, y, z]}"
            },
            "spawn": {
                "type": "object",
                "default": {"center": [0.0, 0.0, 0.0], "half_extent": [5.0, 5.0, 5.0]},
                "description": "Box {center, half_extent} that seeds and respawns particles"
            }
        })
    }
}

/// `default` when absent; otherwise the value must be an integer >= 1.
fn grid_dimension(params: &Value, name: &str, default: usize) -> Result<usize, SimError> {
    match params.get(name) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .filter(|&n| n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(SimError::InvalidDimensions),
    }
}

/// `default` when absent; otherwise the value must be a JSON number.
fn number(params: &Value, name: &str, default: f64) -> Result<f64, SimError> {
    match params.get(name) {
        None => Ok(default),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| SimError::invalid(name, format!("expected a number, got {v}"))),
    }
}
