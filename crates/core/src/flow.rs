//! Flow fields: deterministic 3D vector fields sampled per particle.
//!
//! A [`FlowField`] produces a velocity contribution at any point in space
//! and time. [`CurlNoise`] takes the curl of a Perlin potential, which makes
//! the resulting flow divergence-free: particles advected by it neither
//! bunch up nor thin out. [`StillField`] is the zero field.
//!
//! All implementations are deterministic: same inputs produce the same output.

use glam::DVec3;
use noise::{NoiseFn, Perlin};

/// A source of 3D vector values for particle advection.
///
/// Implementations must be pure: the same `(position, time)` always yields
/// the same vector, and sampling must not depend on any other particle.
pub trait FlowField: Send + Sync {
    /// Sample the field at `position` at the given time.
    fn sample(&self, position: DVec3, time: f64) -> DVec3;
}

/// The zero field. Useful for force-free runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StillField;

impl FlowField for StillField {
    fn sample(&self, _position: DVec3, _time: f64) -> DVec3 {
        DVec3::ZERO
    }
}

/// Curl noise: curl of the vector potential `(ψ, ψ, ψ)` where ψ is 4D
/// Perlin noise over `(x, y, z, time)`.
///
/// Partial derivatives of ψ are taken by central differences with step
/// `eps`, so
///
/// ```text
/// curl = (∂ψ/∂y − ∂ψ/∂z, ∂ψ/∂z − ∂ψ/∂x, ∂ψ/∂x − ∂ψ/∂y)
/// ```
///
/// Time is a fourth noise coordinate rather than a spatial offset, so the
/// field stays divergence-free at every instant.
pub struct CurlNoise {
    potential: Perlin,
    eps: f64,
}

/// Distances below this are treated as zero.
const SINGULARITY_EPS: f64 = 1e-12;

/// Largest coordinate magnitude handed to the Perlin lattice, which
/// truncates coordinates to `isize` and panics outside that range.
const MAX_LATTICE_COORDINATE: f64 = (1u64 << 62) as f64;

impl CurlNoise {
    /// Default finite-difference step.
    pub const DEFAULT_EPSILON: f64 = 1e-4;

    /// Creates a curl noise field with the default finite-difference step.
    pub fn new(seed: u32) -> Self {
        Self::with_epsilon(seed, Self::DEFAULT_EPSILON)
    }

    /// Creates a curl noise field with a custom finite-difference step.
    ///
    /// A step that is not finite or not above [`SINGULARITY_EPS`] falls
    /// back to [`Self::DEFAULT_EPSILON`].
    pub fn with_epsilon(seed: u32, eps: f64) -> Self {
        let eps = if eps.is_finite() && eps > SINGULARITY_EPS {
            eps
        } else {
            Self::DEFAULT_EPSILON
        };
        Self {
            potential: Perlin::new(seed),
            eps,
        }
    }

    /// Finite-difference step in use.
    pub fn epsilon(&self) -> f64 {
        self.eps
    }

    /// The scalar potential ψ at `(p, time)`.
    ///
    /// NaN when any coordinate is non-finite or beyond ±2^62; the curl is
    /// then NaN too and the integrator's recovery path takes over.
    pub fn potential(&self, p: DVec3, time: f64) -> f64 {
        let coords = [p.x, p.y, p.z, time];
        if coords
            .iter()
            .all(|c| c.is_finite() && c.abs() <= MAX_LATTICE_COORDINATE)
        {
            self.potential.get(coords)
        } else {
            f64::NAN
        }
    }

    /// Unscaled central difference `ψ(p + e·axis) − ψ(p − e·axis)`.
    fn delta(&self, p: DVec3, time: f64, axis: DVec3) -> f64 {
        let offset = axis * self.eps;
        self.potential(p + offset, time) - self.potential(p - offset, time)
    }
}

impl FlowField for CurlNoise {
    fn sample(&self, position: DVec3, time: f64) -> DVec3 {
        let dx = self.delta(position, time, DVec3::X);
        let dy = self.delta(position, time, DVec3::Y);
        let dz = self.delta(position, time, DVec3::Z);
        DVec3::new(dy - dz, dz - dx, dx - dy) / (2.0 * self.eps)
    }
}

/// Central-difference divergence of `field` at `p` with step `h`.
pub fn divergence(field: &dyn FlowField, p: DVec3, time: f64, h: f64) -> f64 {
    let ddx = field.sample(p + DVec3::X * h, time).x - field.sample(p - DVec3::X * h, time).x;
    let ddy = field.sample(p + DVec3::Y * h, time).y - field.sample(p - DVec3::Y * h, time).y;
    let ddz = field.sample(p + DVec3::Z * h, time).z - field.sample(p - DVec3::Z * h, time).z;
    (ddx + ddy + ddz) / (2.0 * h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_field_is_zero_everywhere() {
        let f = StillField;
        assert_eq!(f.sample(DVec3::new(1.0, -2.0, 3.0), 4.0), DVec3::ZERO);
    }

    #[test]
    fn curl_noise_is_deterministic() {
        let a = CurlNoise::new(42);
        let b = CurlNoise::new(42);
        let p = DVec3::new(0.37, 1.91, -2.44);
        assert_eq!(a.sample(p, 0.5), b.sample(p, 0.5));
    }

    #[test]
    fn curl_noise_is_not_degenerate() {
        let f = CurlNoise::new(7);
        let total: f64 = (0..32)
            .map(|i| {
                let t = i as f64 * 0.173;
                f.sample(DVec3::new(t + 0.31, 0.5 * t - 0.77, 1.3 - t), 0.2)
                    .length()
            })
            .sum();
        assert!(total > 1e-3, "curl noise should not vanish, got total {total}");
    }

    #[test]
    fn different_seeds_produce_different_flow() {
        let a = CurlNoise::new(1);
        let b = CurlNoise::new(2);
        let p = DVec3::new(0.37, 1.91, -2.44);
        assert_ne!(a.sample(p, 0.0), b.sample(p, 0.0));
    }

    #[test]
    fn time_changes_the_flow() {
        let f = CurlNoise::new(3);
        let p = DVec3::new(0.37, 1.91, -2.44);
        assert_ne!(f.sample(p, 0.0), f.sample(p, 0.45));
    }

    #[test]
    fn invalid_epsilon_falls_back_to_default() {
        assert_eq!(
            CurlNoise::with_epsilon(1, 0.0).epsilon(),
            CurlNoise::DEFAULT_EPSILON
        );
        assert_eq!(
            CurlNoise::with_epsilon(1, f64::NAN).epsilon(),
            CurlNoise::DEFAULT_EPSILON
        );
        assert_eq!(CurlNoise::with_epsilon(1, 1e-3).epsilon(), 1e-3);
    }

    #[test]
    fn non_finite_or_huge_coordinates_yield_nan_instead_of_panicking() {
        let f = CurlNoise::new(5);
        assert!(f.sample(DVec3::new(f64::NAN, 0.0, 0.0), 0.0).is_nan());
        assert!(f.sample(DVec3::new(0.0, f64::INFINITY, 0.0), 0.0).is_nan());
        assert!(f.sample(DVec3::new(0.0, 0.0, 1e300), 0.0).is_nan());
        assert!(f.sample(DVec3::ONE, 1e20).is_nan());
        assert!(f.potential(DVec3::ZERO, f64::NEG_INFINITY).is_nan());
    }

    #[test]
    fn large_finite_coordinates_are_still_sampled() {
        let f = CurlNoise::new(5);
        assert!(f.potential(DVec3::splat(1e15), 1e15).is_finite());
    }

    #[test]
    fn still_field_has_zero_divergence() {
        assert_eq!(divergence(&StillField, DVec3::ONE, 0.0, 1e-3), 0.0);
    }

    #[test]
    fn flow_field_is_object_safe() {
        let fields: Vec<Box<dyn FlowField>> = vec![Box::new(StillField), Box::new(CurlNoise::new(0))];
        for f in &fields {
            assert!(f.sample(DVec3::ZERO, 0.0).is_finite());
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn discrete_divergence_is_zero(
                seed in 0u32..1000,
                x in -50.0_f64..50.0,
                y in -50.0_f64..50.0,
                z in -50.0_f64..50.0,
                t in 0.0_f64..10.0,
            ) {
                let f = CurlNoise::new(seed);
                let p = DVec3::new(x, y, z);
                let div = divergence(&f, p, t, f.epsilon());
                let scale = f.sample(p, t).length().max(1.0);
                prop_assert!(
                    div.abs() < 1e-3 * scale,
                    "divergence {div} at {p} (t = {t}) for seed {seed}"
                );
            }

            #[test]
            fn samples_are_finite(
                seed in 0u32..1000,
                x in -1e3_f64..1e3,
                y in -1e3_f64..1e3,
                z in -1e3_f64..1e3,
            ) {
                let f = CurlNoise::new(seed);
                prop_assert!(f.sample(DVec3::new(x, y, z), 1.0).is_finite());
            }
        }
    }
}
