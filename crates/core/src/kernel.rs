//! The `Kernel` trait every particle simulation kernel implements, and the
//! per-tick inputs it consumes.
//!
//! The trait is object-safe so hosts can drive a `dyn Kernel` without
//! knowing which force model sits behind it.

use crate::error::SimError;
use crate::reader::StateReader;
use glam::DVec3;
use serde_json::Value;

/// Pointer (cursor, touch, controller ray hit) in simulation space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub position: DVec3,
    pub strength: f64,
}

/// Everything a host supplies for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Seconds since the previous tick. Clamped by the kernel.
    pub dt: f64,
    /// Seconds since the session started; drives the noise time axis.
    pub elapsed_time: f64,
    /// `None` when no pointer is active.
    pub pointer: Option<PointerInput>,
}

impl TickInput {
    /// A tick with no pointer.
    pub fn new(dt: f64, elapsed_time: f64) -> Self {
        Self {
            dt,
            elapsed_time,
            pointer: None,
        }
    }

    /// Attaches a pointer to this tick.
    pub fn with_pointer(mut self, position: DVec3, strength: f64) -> Self {
        self.pointer = Some(PointerInput { position, strength });
        self
    }

    /// Rejects inputs that would poison every cell: a non-finite clock or
    /// pointer. A bad `dt` is not an error; kernels clamp it.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.elapsed_time.is_finite() {
            return Err(SimError::InvalidTickInput(format!(
                "elapsed_time must be finite, got {}",
                self.elapsed_time
            )));
        }
        if let Some(p) = &self.pointer {
            if !p.position.is_finite() || !p.strength.is_finite() {
                return Err(SimError::InvalidTickInput(format!(
                    "pointer must be finite, got position {} strength {}",
                    p.position, p.strength
                )));
            }
        }
        Ok(())
    }
}

/// What a call to [`Kernel::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Both passes ran and the buffers swapped.
    Advanced {
        /// Tick number just completed, starting at 1.
        tick: u64,
        /// The delta time actually applied after clamping.
        dt: f64,
    },
    /// The kernel is paused; state is unchanged.
    Paused,
}

/// Core trait for particle simulation kernels.
pub trait Kernel {
    /// Advance every particle by one tick.
    fn tick(&mut self, input: &TickInput) -> Result<TickOutcome, SimError>;

    /// Read-only view of the current front buffer.
    fn reader(&self) -> StateReader<'_>;

    /// Current configuration as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing every configuration key, its type, range and default.
    fn param_schema(&self) -> Value;

    /// Stop advancing; subsequent ticks return [`TickOutcome::Paused`].
    fn pause(&mut self);

    /// Resume after [`Kernel::pause`].
    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Reinitialise both buffers from the original seed and zero the clock.
    fn reset(&mut self);

    /// Number of ticks completed since construction or the last reset.
    fn tick_count(&self) -> u64;
}
