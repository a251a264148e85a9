//! Read-only projection of the front buffer for an external renderer.

use crate::cell::ParticleCell;
use glam::DVec3;

/// Borrowed view of the current front buffer.
///
/// Obtained from [`StateBuffer::reader`](crate::state::StateBuffer::reader)
/// after a tick has swapped. It only ever points at the front allocation, so
/// a renderer never sees a half-written pass. Cell index `i` maps to one
/// drawable primitive.
#[derive(Debug, Clone, Copy)]
pub struct StateReader<'a> {
    width: usize,
    height: usize,
    cells: &'a [ParticleCell],
}

impl<'a> StateReader<'a> {
    pub(crate) fn new(width: usize, height: usize, cells: &'a [ParticleCell]) -> Self {
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in index order.
    pub fn cells(&self) -> &'a [ParticleCell] {
        self.cells
    }

    /// Cell at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&'a ParticleCell> {
        self.cells.get(index)
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = DVec3> + 'a {
        self.cells.iter().map(|c| c.position)
    }

    pub fn velocities(&self) -> impl ExactSizeIterator<Item = DVec3> + 'a {
        self.cells.iter().map(|c| c.velocity)
    }

    /// Positions packed as `[f32; 3]`, the layout vertex buffers expect.
    pub fn positions_f32(&self) -> Vec<[f32; 3]> {
        self.positions().map(|p| p.as_vec3().to_array()).collect()
    }

    /// Axis-aligned bounding box `(min, max)` of all positions.
    pub fn bounds(&self) -> (DVec3, DVec3) {
        self.positions().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        )
    }

    /// Mean particle speed.
    pub fn mean_speed(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.velocities().map(DVec3::length).sum::<f64>() / self.cells.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateBuffer;

    fn two_cells() -> StateBuffer {
        let cells = vec![
            ParticleCell::moving(DVec3::new(-1.0, 2.0, 0.5), DVec3::new(3.0, 4.0, 0.0)),
            ParticleCell::moving(DVec3::new(4.0, -3.0, 1.5), DVec3::ZERO),
        ];
        StateBuffer::from_cells(2, 1, cells).unwrap()
    }

    #[test]
    fn reader_reports_grid_shape() {
        let b = two_cells();
        let r = b.reader();
        assert_eq!((r.width(), r.height(), r.len()), (2, 1, 2));
        assert!(!r.is_empty());
    }

    #[test]
    fn get_returns_none_past_end() {
        let b = two_cells();
        assert!(b.reader().get(1).is_some());
        assert!(b.reader().get(2).is_none());
    }

    #[test]
    fn bounds_cover_all_positions() {
        let b = two_cells();
        let (lo, hi) = b.reader().bounds();
        assert_eq!(lo, DVec3::new(-1.0, -3.0, 0.5));
        assert_eq!(hi, DVec3::new(4.0, 2.0, 1.5));
    }

    #[test]
    fn positions_f32_matches_positions() {
        let b = two_cells();
        let packed = b.reader().positions_f32();
        assert_eq!(packed, vec![[-1.0, 2.0, 0.5], [4.0, -3.0, 1.5]]);
    }

    #[test]
    fn mean_speed_averages_velocity_lengths() {
        let b = two_cells();
        assert!((b.reader().mean_speed() - 2.5).abs() < 1e-12);
    }
}
