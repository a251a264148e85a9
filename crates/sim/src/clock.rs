//! Tick admission: delta-time clamping, pause and reset.

/// Timing for one admitted tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTime {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Delta time after clamping to `[0, max_dt]`.
    pub dt: f64,
    /// Elapsed time supplied by the host.
    pub time: f64,
}

/// Counts ticks and decides whether, and with what `dt`, the next one runs.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    max_dt: f64,
    tick: u64,
    elapsed: f64,
    paused: bool,
}

impl SimulationClock {
    pub fn new(max_dt: f64) -> Self {
        Self {
            max_dt,
            tick: 0,
            elapsed: 0.0,
            paused: false,
        }
    }

    /// Clamps `dt` to `[0, max_dt]`. Non-finite or negative values become 0.
    pub fn clamp_dt(&self, dt: f64) -> f64 {
        if dt.is_nan() || dt <= 0.0 {
            0.0
        } else {
            dt.min(self.max_dt)
        }
    }

    /// Admits the next tick, or returns `None` while paused.
    pub fn admit(&mut self, dt: f64, elapsed_time: f64) -> Option<TickTime> {
        if self.paused {
            return None;
        }
        let clamped = self.clamp_dt(dt);
        if clamped != dt {
            log::debug!("dt {dt} clamped to {clamped}");
        }
        self.tick += 1;
        self.elapsed = elapsed_time;
        Some(TickTime {
            tick: self.tick,
            dt: clamped,
            time: elapsed_time,
        })
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Zeroes the tick counter and elapsed time. The pause state is kept.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.elapsed = 0.0;
    }

    /// Ticks admitted since construction or the last reset.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed time of the most recent admitted tick.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }
}
