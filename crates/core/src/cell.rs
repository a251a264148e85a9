//! Per-particle state and the volume new particles are drawn from.

use crate::prng::Xorshift64;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One particle. Lives at a fixed index for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleCell {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Set when an update produced a non-finite value; the next position
    /// pass respawns the cell and clears the flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub respawn_pending: bool,
}

impl ParticleCell {
    /// A resting cell at `position`.
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            respawn_pending: false,
        }
    }

    /// A cell at `position` moving with `velocity`.
    pub fn moving(position: DVec3, velocity: DVec3) -> Self {
        Self {
            position,
            velocity,
            respawn_pending: false,
        }
    }

    /// True when every position and velocity component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Axis-aligned box `center ± half_extent` that seeds and respawns particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnVolume {
    pub center: DVec3,
    pub half_extent: DVec3,
}

impl Default for SpawnVolume {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            half_extent: DVec3::splat(5.0),
        }
    }
}

impl SpawnVolume {
    /// Draws the next point from `rng`.
    pub fn sample(&self, rng: &mut Xorshift64) -> DVec3 {
        rng.next_in_box(self.center, self.half_extent)
    }

    /// Deterministic respawn point for cell `index` at `tick`.
    ///
    /// Depends only on its arguments, so any cell can be respawned without
    /// consulting shared generator state.
    pub fn respawn_point(&self, seed: u64, index: usize, tick: u64) -> DVec3 {
        let mut rng = Xorshift64::for_slot(seed, index as u64, tick);
        self.sample(&mut rng)
    }

    /// True if `p` lies inside the box (inclusive).
    pub fn contains(&self, p: DVec3) -> bool {
        let d = (p - self.center).abs();
        d.x <= self.half_extent.x && d.y <= self.half_extent.y && d.z <= self.half_extent.z
    }
}
