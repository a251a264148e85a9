//! Deterministic PRNG based on the Xorshift64 algorithm.
//!
//! Seeds the initial particle cloud and picks respawn points. Same seed
//! always produces the same sequence of values across all platforms (pure
//! integer arithmetic in the core algorithm).

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). Seed of 0 is replaced
/// with a non-zero fallback to avoid the all-zeros fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Fallback seed used when the caller provides 0.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Creates an independent generator for one `(index, tick)` slot of a run.
    ///
    /// The three inputs are folded through splitmix64 so neighbouring
    /// indices and ticks start from unrelated states. Used where a per-cell
    /// update needs randomness without sharing a generator across cells.
    pub fn for_slot(seed: u64, index: u64, tick: u64) -> Self {
        let mixed = splitmix64(splitmix64(seed ^ splitmix64(index)) ^ tick);
        Self::new(mixed)
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    ///
    /// Uses the upper 53 bits of `next_u64()` for full mantissa precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a point drawn uniformly from the box `center ± half_extent`.
    pub fn next_in_box(&mut self, center: DVec3, half_extent: DVec3) -> DVec3 {
        let x = self.next_range(-1.0, 1.0);
        let y = self.next_range(-1.0, 1.0);
        let z = self.next_range(-1.0, 1.0);
        center + DVec3::new(x, y, z) * half_extent
    }
}

/// splitmix64 finalizer.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // If this breaks, every stored RunSpec replays differently.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        assert_ne!(rng.next_u64(), 0, "seed=0 guard failed");
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn two_instances_with_same_seed_produce_identical_sequences() {
        let mut a = Xorshift64::new(42);
        let mut b = Xorshift64::new(42);
        for i in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64(), "sequences diverged at index {i}");
        }
    }

    #[test]
    fn for_slot_is_deterministic() {
        let mut a = Xorshift64::for_slot(7, 123, 9);
        let mut b = Xorshift64::for_slot(7, 123, 9);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn for_slot_separates_neighbouring_indices_and_ticks() {
        let base = Xorshift64::for_slot(7, 10, 3).next_u64();
        assert_ne!(base, Xorshift64::for_slot(7, 11, 3).next_u64());
        assert_ne!(base, Xorshift64::for_slot(7, 10, 4).next_u64());
        assert_ne!(base, Xorshift64::for_slot(8, 10, 3).next_u64());
    }

    #[test]
    fn next_in_box_stays_inside_box() {
        let mut rng = Xorshift64::new(99);
        let center = DVec3::new(1.0, -2.0, 3.0);
        let half = DVec3::new(0.5, 2.0, 0.0);
        for i in 0..5_000 {
            let p = rng.next_in_box(center, half);
            let d = (p - center).abs();
            assert!(
                d.x <= half.x && d.y <= half.y && d.z <= half.z,
                "point {p} outside box at iteration {i}"
            );
        }
    }

    #[test]
    fn serialization_roundtrip_preserves_state() {
        let mut rng = Xorshift64::new(42);
        for _ in 0..50 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: Xorshift64 = serde_json::from_str(&json).unwrap();
        for i in 0..100 {
            assert_eq!(
                rng.next_u64(),
                restored.next_u64(),
                "sequences diverged after deserialization at index {i}"
            );
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v), "next_f64() = {v} for seed {seed}");
                }
            }

            #[test]
            fn next_range_in_bounds_for_any_seed_and_range(
                seed: u64,
                min in -1e6_f64..1e6,
                max in -1e6_f64..1e6,
            ) {
                prop_assume!(min < max);
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_range(min, max);
                    prop_assert!(v >= min && v < max, "next_range({min}, {max}) = {v}");
                }
            }

            #[test]
            fn next_f64_approximate_uniformity(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                let mut buckets = [0u32; 10];
                for _ in 0..10_000 {
                    let idx = (rng.next_f64() * 10.0).min(9.0) as usize;
                    buckets[idx] += 1;
                }
                for (i, &count) in buckets.iter().enumerate() {
                    prop_assert!(count >= 500, "bucket {i} has only {count} values for seed {seed}");
                }
            }
        }
    }
}
