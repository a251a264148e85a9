//! Per-cell force composition.
//!
//! Order is fixed: curl noise, gravity and damping act on velocity; pointer
//! attraction then displaces the position directly. Attraction in position
//! space gives the pointer an immediate snap, while the velocity-space
//! forces produce drift.

use crate::config::SimulationConfig;
use curlflow_core::{FlowField, ParticleCell, PointerInput};
use glam::DVec3;

/// Distances below this are treated as zero.
const SINGULARITY_EPS: f64 = 1e-12;

/// Inputs shared by every cell for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// Clamped delta time.
    pub dt: f64,
    /// Elapsed time fed to the noise.
    pub time: f64,
    /// Number of the tick being computed, starting at 1.
    pub tick: u64,
    pub pointer: Option<PointerInput>,
    /// Run seed, used to place respawned cells.
    pub seed: u64,
}

/// Result of composing every force for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceUpdate {
    /// Velocity after noise, gravity, damping and the speed cap.
    pub velocity: DVec3,
    /// Total position change: integrated velocity plus pointer displacement.
    pub position_delta: DVec3,
}

/// Combines the flow field, gravity, damping and pointer attraction.
pub struct ForceComposer<'a> {
    field: &'a dyn FlowField,
    config: &'a SimulationConfig,
}

impl<'a> ForceComposer<'a> {
    pub fn new(field: &'a dyn FlowField, config: &'a SimulationConfig) -> Self {
        Self { field, config }
    }

    pub fn config(&self) -> &'a SimulationConfig {
        self.config
    }

    /// Velocity after noise, gravity and damping, before the speed cap.
    pub fn accelerate(&self, cell: &ParticleCell, ctx: &TickContext) -> DVec3 {
        let cfg = self.config;
        let curl = self.field.sample(
            cell.position * cfg.noise_frequency,
            ctx.time * cfg.noise_time_scale,
        );
        let mut velocity = cell.velocity + curl * cfg.noise_gain;
        velocity.y += cfg.gravity * ctx.dt;
        velocity * cfg.damping
    }

    /// [`Self::accelerate`] followed by the hard speed cap.
    pub fn next_velocity(&self, cell: &ParticleCell, ctx: &TickContext) -> DVec3 {
        self.accelerate(cell, ctx)
            .clamp_length_max(self.config.max_speed)
    }

    /// Direct position displacement toward the pointer, or zero when the
    /// pointer is absent, out of range, or exactly on top of `position`.
    pub fn pointer_displacement(&self, position: DVec3, ctx: &TickContext) -> DVec3 {
        let Some(pointer) = ctx.pointer else {
            return DVec3::ZERO;
        };
        let radius = self.config.pointer_radius;
        let toward = pointer.position - position;
        let distance = toward.length();
        if distance >= radius || distance < SINGULARITY_EPS {
            return DVec3::ZERO;
        }
        let strength = pointer.strength * self.config.pointer_strength;
        toward / distance * (radius - distance) * strength * ctx.dt
    }

    /// New position: `position` moved by `velocity * dt`, then pulled toward
    /// the pointer from where it landed.
    pub fn advect(&self, position: DVec3, velocity: DVec3, ctx: &TickContext) -> DVec3 {
        let moved = position + velocity * ctx.dt;
        moved + self.pointer_displacement(moved, ctx)
    }

    /// Every force applied to one cell in one call. The integrator splits
    /// this across its two passes via [`Self::next_velocity`] and
    /// [`Self::advect`].
    pub fn compute_update(&self, cell: &ParticleCell, ctx: &TickContext) -> ForceUpdate {
        let velocity = self.next_velocity(cell, ctx);
        ForceUpdate {
            velocity,
            position_delta: self.advect(cell.position, velocity, ctx) - cell.position,
        }
    }
}
