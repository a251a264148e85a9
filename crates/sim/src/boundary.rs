//! Boundary handling applied to each cell at the end of the position pass.
//!
//! Two policies exist: respawn cells that fall below a plane on one axis, or
//! wrap every axis into a periodic cube. Both look at a single cell only.

use curlflow_core::error::SimError;
use curlflow_core::params::{param_f64, param_string, param_vec3};
use curlflow_core::ParticleCell;
use glam::DVec3;
use serde_json::{json, Value};

/// Default half-width of the periodic cube.
pub const DEFAULT_WRAP_EXTENT: f64 = 10.0;
/// Default plane below which respawning cells are reset.
const DEFAULT_LOWER_BOUND: f64 = -10.0;
/// Default respawn position.
const DEFAULT_RESET: DVec3 = DVec3::new(0.0, 10.0, 0.0);

/// Spatial axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index: 0, 1 or 2.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Parses `"x"`, `"y"` or `"z"` (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        match name.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(SimError::invalid(
                "boundary.axis",
                format!("expected x, y or z, got '{other}'"),
            )),
        }
    }
}

/// Per-cell boundary rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryPolicy {
    /// If `position[axis] < lower_bound`, move the cell to `reset` and zero
    /// its velocity along `axis`.
    RespawnAxis {
        axis: Axis,
        lower_bound: f64,
        reset: DVec3,
    },
    /// Periodic domain `[-extent, extent)` on every axis. Velocity is kept.
    WrapAllAxes { extent: f64 },
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::WrapAllAxes {
            extent: DEFAULT_WRAP_EXTENT,
        }
    }
}

impl BoundaryPolicy {
    /// Reads a policy from `{"mode": "wrap", "extent": ..}` or
    /// `{"mode": "respawn", "axis": "y", "lower_bound": .., "reset": [x, y, z]}`.
    ///
    /// Missing keys take defaults; an unknown mode is an error.
    pub fn from_json(params: &Value) -> Result<Self, SimError> {
        match param_string(params, "mode", "wrap").as_str() {
            "wrap" => Ok(BoundaryPolicy::WrapAllAxes {
                extent: param_f64(params, "extent", DEFAULT_WRAP_EXTENT),
            }),
            "respawn" => Ok(BoundaryPolicy::RespawnAxis {
                axis: Axis::from_name(&param_string(params, "axis", "y"))?,
                lower_bound: param_f64(params, "lower_bound", DEFAULT_LOWER_BOUND),
                reset: param_vec3(params, "reset", DEFAULT_RESET),
            }),
            other => Err(SimError::invalid(
                "boundary.mode",
                format!("expected 'wrap' or 'respawn', got '{other}'"),
            )),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            BoundaryPolicy::WrapAllAxes { extent } => json!({
                "mode": "wrap",
                "extent": extent,
            }),
            BoundaryPolicy::RespawnAxis {
                axis,
                lower_bound,
                reset,
            } => json!({
                "mode": "respawn",
                "axis": axis.name(),
                "lower_bound": lower_bound,
                "reset": [reset.x, reset.y, reset.z],
            }),
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            BoundaryPolicy::WrapAllAxes { extent } => {
                if !(extent.is_finite() && extent > 0.0) {
                    return Err(SimError::invalid(
                        "boundary.extent",
                        format!("must be finite and > 0, got {extent}"),
                    ));
                }
            }
            BoundaryPolicy::RespawnAxis {
                lower_bound, reset, ..
            } => {
                if !lower_bound.is_finite() {
                    return Err(SimError::invalid("boundary.lower_bound", "must be finite"));
                }
                if !reset.is_finite() {
                    return Err(SimError::invalid("boundary.reset", "must be finite"));
                }
            }
        }
        Ok(())
    }

    /// Applies the policy to `cell` in place. Returns true if the cell was
    /// respawned.
    pub fn apply(&self, cell: &mut ParticleCell) -> bool {
        match *self {
            BoundaryPolicy::RespawnAxis {
                axis,
                lower_bound,
                reset,
            } => {
                if cell.position[axis.index()] < lower_bound {
                    cell.position = reset;
                    cell.velocity[axis.index()] = 0.0;
                    true
                } else {
                    false
                }
            }
            BoundaryPolicy::WrapAllAxes { extent } => {
                cell.position = wrap_position(cell.position, extent);
                false
            }
        }
    }
}

/// `rem_euclid(p + extent, 2·extent) − extent` per component. Components
/// already inside `[-extent, extent)` are returned untouched so in-domain
/// cells stay bit-identical.
pub fn wrap_position(p: DVec3, extent: f64) -> DVec3 {
    let wrap = |c: f64| {
        if c < -extent || c >= extent {
            (c + extent).rem_euclid(2.0 * extent) - extent
        } else {
            c
        }
    };
    DVec3::new(wrap(p.x), wrap(p.y), wrap(p.z))
}
