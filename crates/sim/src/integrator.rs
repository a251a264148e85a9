//! Two-pass update over a [`StateBuffer`].
//!
//! The velocity pass reads the front buffer and writes velocities into the
//! back buffer. Only after every cell is written does the position pass run:
//! it reads back-buffer velocities and front-buffer positions, moves the
//! cell, applies pointer attraction and the boundary policy, and writes the
//! result into the back buffer. A swap then publishes the back buffer.
//!
//! Both passes are rayon parallel iterators. The first iterator completing
//! is the barrier before the second; cells never read each other.

use crate::forces::{ForceComposer, TickContext};
use curlflow_core::{ParticleCell, StateBuffer};
use rayon::prelude::*;

/// Where the integrator is within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    VelocityPass,
    PositionPass,
    Swapped,
}

/// What happened to a single cell during the position pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEvent {
    Moved,
    /// The boundary policy reset the cell.
    BoundaryRespawn,
    /// A flagged cell was moved back into the spawn volume.
    Respawned,
    /// The position update went non-finite; the cell kept its previous
    /// position and is flagged for the next tick.
    Recovered,
}

/// Per-tick counts, used for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    /// Cells whose update went non-finite in either pass.
    pub recovered: usize,
    /// Flagged cells respawned in the spawn volume.
    pub respawned: usize,
    /// Cells reset by a `RespawnAxis` boundary.
    pub boundary_respawns: usize,
}

impl PassStats {
    fn merge(self, other: Self) -> Self {
        Self {
            recovered: self.recovered + other.recovered,
            respawned: self.respawned + other.respawned,
            boundary_respawns: self.boundary_respawns + other.boundary_respawns,
        }
    }

    /// True if nothing out of the ordinary happened.
    pub fn is_quiet(&self) -> bool {
        *self == Self::default()
    }
}

impl From<CellEvent> for PassStats {
    fn from(event: CellEvent) -> Self {
        let mut stats = Self::default();
        match event {
            CellEvent::Moved => {}
            CellEvent::BoundaryRespawn => stats.boundary_respawns = 1,
            CellEvent::Respawned => stats.respawned = 1,
            CellEvent::Recovered => stats.recovered = 1,
        }
        stats
    }
}

/// Drives the velocity pass, position pass and swap.
#[derive(Debug, Default)]
pub struct Integrator {
    phase: Phase,
}

impl Integrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase. Always [`Phase::Idle`] between ticks.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs one complete tick over `state`.
    pub fn step(
        &mut self,
        state: &mut StateBuffer,
        composer: &ForceComposer<'_>,
        ctx: &TickContext,
    ) -> PassStats {
        let (front, back) = state.split();

        self.enter(Phase::VelocityPass);
        let recovered: usize = back
            .par_iter_mut()
            .zip(front.par_iter())
            .map(|(dst, src)| {
                let (cell, failed) = velocity_cell(src, composer, ctx);
                *dst = cell;
                usize::from(failed)
            })
            .sum();

        self.enter(Phase::PositionPass);
        let stats = back
            .par_iter_mut()
            .zip(front.par_iter())
            .enumerate()
            .map(|(index, (dst, src))| {
                let (cell, event) = position_cell(index, src, dst, composer, ctx);
                *dst = cell;
                PassStats::from(event)
            })
            .reduce(PassStats::default, PassStats::merge);

        state.swap();
        self.enter(Phase::Swapped);
        self.enter(Phase::Idle);

        PassStats {
            recovered: stats.recovered + recovered,
            ..stats
        }
    }

    fn enter(&mut self, phase: Phase) {
        log::trace!("integrator {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// Velocity pass for one cell. Position is passed through unchanged.
///
/// A cell that is already non-finite is flagged without sampling the field.
/// A non-finite result keeps the pre-update velocity and flags the cell.
/// The returned bool is true in both cases.
pub fn velocity_cell(
    src: &ParticleCell,
    composer: &ForceComposer<'_>,
    ctx: &TickContext,
) -> (ParticleCell, bool) {
    let mut cell = *src;
    if !src.is_finite() {
        cell.respawn_pending = true;
        return (cell, true);
    }
    let velocity = composer.next_velocity(src, ctx);
    if velocity.is_finite() {
        cell.velocity = velocity;
        (cell, false)
    } else {
        cell.respawn_pending = true;
        (cell, true)
    }
}

/// Position pass for cell `index`.
///
/// `front` is the cell's state at the start of the tick; `staged` is what
/// the velocity pass wrote for it.
pub fn position_cell(
    index: usize,
    front: &ParticleCell,
    staged: &ParticleCell,
    composer: &ForceComposer<'_>,
    ctx: &TickContext,
) -> (ParticleCell, CellEvent) {
    let config = composer.config();
    if staged.respawn_pending {
        let position = config.spawn.respawn_point(ctx.seed, index, ctx.tick);
        return (ParticleCell::at(position), CellEvent::Respawned);
    }

    let velocity = staged.velocity;
    let mut cell = ParticleCell::moving(composer.advect(front.position, velocity, ctx), velocity);
    let hit = config.boundary.apply(&mut cell);

    if !cell.is_finite() {
        let mut kept = ParticleCell::moving(front.position, velocity);
        kept.respawn_pending = true;
        return (kept, CellEvent::Recovered);
    }
    let event = if hit {
        CellEvent::BoundaryRespawn
    } else {
        CellEvent::Moved
    };
    (cell, event)
}
