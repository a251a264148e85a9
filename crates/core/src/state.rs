//! Double-buffered particle state.
//!
//! A [`StateBuffer`] owns exactly two cell allocations for the whole
//! session. One is the front (readable) buffer, the other is the back
//! buffer the next tick writes into. [`PingPong`] tracks which is which;
//! swapping flips an atomic index and never copies cells.

use crate::cell::{ParticleCell, SpawnVolume};
use crate::error::SimError;
use crate::prng::Xorshift64;
use crate::reader::StateReader;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tracks which of two buffers is the front. The invariant
/// `front_index() + back_index() == 1` always holds.
///
/// The index is published with release ordering and read with acquire
/// ordering, so a reader that sees the new index also sees every cell
/// written before the swap.
#[derive(Debug, Default)]
pub struct PingPong {
    current: AtomicUsize,
}

impl PingPong {
    /// Front at index 0, back at index 1.
    pub fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
        }
    }

    /// Index of the current front (read) buffer.
    pub fn front_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    /// Index of the current back (write) buffer.
    pub fn back_index(&self) -> usize {
        1 - self.front_index()
    }

    /// Flips front and back in one atomic step.
    pub fn swap(&self) {
        self.current.fetch_xor(1, Ordering::AcqRel);
    }

    /// Makes index 0 the front again.
    pub fn reset(&self) {
        self.current.store(0, Ordering::Release);
    }
}

/// Grid of particle cells stored twice, in row-major order.
#[derive(Debug)]
pub struct StateBuffer {
    width: usize,
    height: usize,
    cells: [Vec<ParticleCell>; 2],
    ping_pong: PingPong,
}

impl StateBuffer {
    /// Builds a buffer from explicit initial cells; both allocations start
    /// as copies of `cells`.
    ///
    /// Returns `SimError::InvalidDimensions` if either dimension is zero,
    /// `width * height` overflows, or `cells.len()` does not match.
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: Vec<ParticleCell>,
    ) -> Result<Self, SimError> {
        let len = checked_len(width, height)?;
        if cells.len() != len {
            return Err(SimError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            cells: [cells.clone(), cells],
            ping_pong: PingPong::new(),
        })
    }

    /// Builds a buffer with positions drawn uniformly from `spawn` and zero
    /// velocities.
    pub fn seeded(
        width: usize,
        height: usize,
        spawn: &SpawnVolume,
        seed: u64,
    ) -> Result<Self, SimError> {
        let len = checked_len(width, height)?;
        Self::from_cells(width, height, initial_cells(len, spawn, seed))
    }

    /// Overwrites both allocations with a fresh seeded cloud and makes
    /// buffer 0 the front. Allocations are reused.
    pub fn reseed(&mut self, spawn: &SpawnVolume, seed: u64) {
        let mut rng = Xorshift64::new(seed);
        let [a, b] = &mut self.cells;
        for (ca, cb) in a.iter_mut().zip(b.iter_mut()) {
            *ca = ParticleCell::at(spawn.sample(&mut rng));
            *cb = *ca;
        }
        self.ping_pong.reset();
    }

    /// Copies `cells` into both allocations and makes buffer 0 the front.
    ///
    /// Returns `SimError::InvalidDimensions`, leaving the buffer untouched,
    /// unless `cells` holds exactly [`Self::len`] entries.
    pub fn restore(&mut self, cells: &[ParticleCell]) -> Result<(), SimError> {
        if cells.len() != self.len() {
            return Err(SimError::InvalidDimensions);
        }
        let [a, b] = &mut self.cells;
        a.copy_from_slice(cells);
        b.copy_from_slice(cells);
        self.ping_pong.reset();
        Ok(())
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of particles, `width * height`.
    pub fn len(&self) -> usize {
        self.cells[0].len()
    }

    /// Always false; a buffer has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index (0 or 1) of the current front allocation.
    pub fn front_index(&self) -> usize {
        self.ping_pong.front_index()
    }

    /// Read-only view of the front buffer.
    pub fn reader(&self) -> StateReader<'_> {
        StateReader::new(self.width, self.height, &self.cells[self.front_index()])
    }

    /// Splits into `(front, back)` for a pass: the front is read-only, the
    /// back is writable.
    pub fn split(&mut self) -> (&[ParticleCell], &mut [ParticleCell]) {
        let front = self.ping_pong.front_index();
        let [a, b] = &mut self.cells;
        if front == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }

    /// Publishes the back buffer as the new front.
    pub fn swap(&self) {
        self.ping_pong.swap();
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, SimError> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(SimError::InvalidDimensions)
}

fn initial_cells(len: usize, spawn: &SpawnVolume, seed: u64) -> Vec<ParticleCell> {
    let mut rng = Xorshift64::new(seed);
    (0..len)
        .map(|_| ParticleCell::at(spawn.sample(&mut rng)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn buffer(w: usize, h: usize) -> StateBuffer {
        StateBuffer::seeded(w, h, &SpawnVolume::default(), 42).unwrap()
    }

    // ---- PingPong ----

    #[test]
    fn ping_pong_starts_with_front_zero() {
        let pp = PingPong::new();
        assert_eq!(pp.front_index(), 0);
        assert_eq!(pp.back_index(), 1);
    }

    #[test]
    fn ping_pong_invariant_holds_over_many_swaps() {
        let pp = PingPong::new();
        for i in 0..101 {
            assert_eq!(pp.front_index() + pp.back_index(), 1, "broken at swap {i}");
            pp.swap();
        }
        assert_eq!(pp.front_index(), 1, "odd swap count should leave front at 1");
        pp.reset();
        assert_eq!(pp.front_index(), 0);
    }

    // ---- Construction ----

    #[test]
    fn seeded_has_width_times_height_cells() {
        let b = buffer(8, 4);
        assert_eq!(b.len(), 32);
        assert_eq!(b.reader().len(), 32);
        assert!(!b.is_empty());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let spawn = SpawnVolume::default();
        assert!(matches!(
            StateBuffer::seeded(0, 4, &spawn, 1),
            Err(SimError::InvalidDimensions)
        ));
        assert!(StateBuffer::seeded(4, 0, &spawn, 1).is_err());
        assert!(StateBuffer::seeded(usize::MAX, 2, &spawn, 1).is_err());
    }

    #[test]
    fn from_cells_rejects_length_mismatch() {
        let cells = vec![ParticleCell::default(); 5];
        assert!(StateBuffer::from_cells(2, 2, cells).is_err());
    }

    #[test]
    fn seeded_cells_start_at_rest_inside_spawn_volume() {
        let spawn = SpawnVolume {
            center: DVec3::new(0.0, 10.0, 0.0),
            half_extent: DVec3::new(1.0, 2.0, 3.0),
        };
        let b = StateBuffer::seeded(16, 16, &spawn, 9).unwrap();
        for c in b.reader().cells() {
            assert_eq!(c.velocity, DVec3::ZERO);
            assert!(spawn.contains(c.position), "{} outside spawn volume", c.position);
        }
    }

    #[test]
    fn same_seed_gives_identical_cloud() {
        let a = buffer(16, 16);
        let b = buffer(16, 16);
        assert_eq!(a.reader().cells(), b.reader().cells());
    }

    // ---- Split / swap ----

    #[test]
    fn writes_to_back_are_invisible_until_swap() {
        let mut b = buffer(2, 2);
        let before = b.reader().cells().to_vec();
        {
            let (_front, back) = b.split();
            back[0].position = DVec3::splat(99.0);
        }
        assert_eq!(b.reader().cells(), before.as_slice());
        b.swap();
        assert_eq!(b.reader().get(0).unwrap().position, DVec3::splat(99.0));
        assert_eq!(b.front_index(), 1);
    }

    #[test]
    fn split_after_swap_reads_the_new_front() {
        let mut b = buffer(2, 2);
        {
            let (_, back) = b.split();
            back[1].velocity = DVec3::X;
        }
        b.swap();
        let (front, _) = b.split();
        assert_eq!(front[1].velocity, DVec3::X);
    }

    #[test]
    fn reseed_restores_initial_cloud_and_front() {
        let spawn = SpawnVolume::default();
        let mut b = StateBuffer::seeded(4, 4, &spawn, 5).unwrap();
        let initial = b.reader().cells().to_vec();
        {
            let (_, back) = b.split();
            back.iter_mut().for_each(|c| c.position = DVec3::ZERO);
        }
        b.swap();
        b.reseed(&spawn, 5);
        assert_eq!(b.front_index(), 0);
        assert_eq!(b.reader().cells(), initial.as_slice());
        let (front, back) = b.split();
        assert_eq!(front, &*back);
    }

    #[test]
    fn restore_copies_cells_into_both_buffers() {
        let cells = vec![
            ParticleCell::at(DVec3::X),
            ParticleCell::moving(DVec3::Y, DVec3::Z),
        ];
        let mut b = StateBuffer::from_cells(2, 1, cells.clone()).unwrap();
        {
            let (_, back) = b.split();
            back[0].position = DVec3::splat(-3.0);
        }
        b.swap();
        b.restore(&cells).unwrap();
        assert_eq!(b.front_index(), 0);
        assert_eq!(b.reader().cells(), cells.as_slice());
        let (front, back) = b.split();
        assert_eq!(front, &*back);
    }

    #[test]
    fn restore_rejects_wrong_length_without_touching_cells() {
        let mut b = buffer(2, 2);
        let before = b.reader().cells().to_vec();
        b.swap();
        for len in [3, 5] {
            let cells = vec![ParticleCell::at(DVec3::ONE); len];
            assert!(matches!(b.restore(&cells), Err(SimError::InvalidDimensions)));
        }
        assert_eq!(b.front_index(), 1);
        assert_eq!(b.reader().cells(), before.as_slice());
    }
}
