//! The curl-flow simulation: configuration, flow field, double buffer,
//! integrator and clock behind the [`Kernel`] trait.

use crate::clock::SimulationClock;
use crate::config::SimulationConfig;
use crate::forces::{ForceComposer, TickContext};
use crate::integrator::{Integrator, Phase};
use curlflow_core::error::SimError;
use curlflow_core::{
    CurlNoise, FlowField, Kernel, ParticleCell, PointerInput, StateBuffer, StateReader,
    TickInput, TickOutcome,
};
use serde_json::Value;

/// How the buffer is restored on [`Kernel::reset`].
enum InitialState {
    /// Re-draw the cloud from the run seed.
    Seeded,
    /// Copy back caller-supplied cells.
    Explicit(Vec<ParticleCell>),
}

/// GPU-style particle kernel evaluated on the CPU.
///
/// Each tick runs a velocity pass (curl noise, gravity, damping, speed cap)
/// and a position pass (integration, pointer attraction, boundary policy)
/// over every particle in parallel, then swaps the double buffer.
pub struct Simulation {
    config: SimulationConfig,
    field: Box<dyn FlowField>,
    state: StateBuffer,
    initial: InitialState,
    integrator: Integrator,
    clock: SimulationClock,
    seed: u64,
}

impl Simulation {
    /// Creates a simulation with a [`CurlNoise`] field and a seeded cloud.
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, SimError> {
        Self::with_field(config, seed, Box::new(CurlNoise::new(noise_seed(seed))))
    }

    /// Creates a simulation from a JSON params object, falling back to
    /// defaults for missing keys.
    pub fn from_json(params: &Value, seed: u64) -> Result<Self, SimError> {
        Self::new(SimulationConfig::from_json(params)?, seed)
    }

    /// Creates a simulation driven by a custom flow field.
    pub fn with_field(
        config: SimulationConfig,
        seed: u64,
        field: Box<dyn FlowField>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let state = StateBuffer::seeded(config.grid_width, config.grid_height, &config.spawn, seed)?;
        Ok(Self::assemble(config, seed, field, state, InitialState::Seeded))
    }

    /// Creates a simulation starting from explicit cells, in grid row-major
    /// order. [`Kernel::reset`] restores exactly these cells.
    pub fn from_cells(
        config: SimulationConfig,
        seed: u64,
        field: Box<dyn FlowField>,
        cells: Vec<ParticleCell>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let state = StateBuffer::from_cells(config.grid_width, config.grid_height, cells.clone())?;
        Ok(Self::assemble(config, seed, field, state, InitialState::Explicit(cells)))
    }

    fn assemble(
        config: SimulationConfig,
        seed: u64,
        field: Box<dyn FlowField>,
        state: StateBuffer,
        initial: InitialState,
    ) -> Self {
        log::info!(
            "curl-flow simulation: {}x{} particles, seed {seed}, boundary {:?}",
            config.grid_width,
            config.grid_height,
            config.boundary
        );
        let clock = SimulationClock::new(config.max_dt);
        Self {
            config,
            field,
            state,
            initial,
            integrator: Integrator::new(),
            clock,
            seed,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Integrator phase; [`Phase::Idle`] whenever the caller can observe it.
    pub fn phase(&self) -> Phase {
        self.integrator.phase()
    }

    /// Elapsed time of the most recent tick.
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    /// Ticks with the clock's own elapsed time advanced by the clamped `dt`.
    ///
    /// Convenient for hosts without a wall clock; replaying the same `dt`
    /// sequence reproduces the same run.
    pub fn advance(
        &mut self,
        dt: f64,
        pointer: Option<PointerInput>,
    ) -> Result<TickOutcome, SimError> {
        let elapsed_time = self.clock.elapsed() + self.clock.clamp_dt(dt);
        self.tick(&TickInput {
            dt,
            elapsed_time,
            pointer,
        })
    }
}

impl Kernel for Simulation {
    fn tick(&mut self, input: &TickInput) -> Result<TickOutcome, SimError> {
        input.validate()?;
        let Some(time) = self.clock.admit(input.dt, input.elapsed_time) else {
            return Ok(TickOutcome::Paused);
        };
        let ctx = TickContext {
            dt: time.dt,
            time: time.time,
            tick: time.tick,
            pointer: input.pointer,
            seed: self.seed,
        };
        let composer = ForceComposer::new(self.field.as_ref(), &self.config);
        let stats = self.integrator.step(&mut self.state, &composer, &ctx);
        if !stats.is_quiet() {
            log::debug!("tick {}: {:?}", time.tick, stats);
        }
        Ok(TickOutcome::Advanced {
            tick: time.tick,
            dt: time.dt,
        })
    }

    fn reader(&self) -> StateReader<'_> {
        self.state.reader()
    }

    fn params(&self) -> Value {
        self.config.to_json()
    }

    fn param_schema(&self) -> Value {
        SimulationConfig::schema()
    }

    fn pause(&mut self) {
        log::debug!("paused at tick {}", self.clock.tick());
        self.clock.pause();
    }

    fn resume(&mut self) {
        log::debug!("resumed at tick {}", self.clock.tick());
        self.clock.resume();
    }

    fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    fn reset(&mut self) {
        match &self.initial {
            InitialState::Seeded => self.state.reseed(&self.config.spawn, self.seed),
            InitialState::Explicit(cells) => {
                if let Err(e) = self.state.restore(cells) {
                    log::warn!("reset could not restore initial cells: {e}");
                }
            }
        }
        self.clock.reset();
        log::info!("simulation reset (seed {})", self.seed);
    }

    fn tick_count(&self) -> u64 {
        self.clock.tick()
    }
}

/// Folds a 64-bit run seed into the 32-bit Perlin seed.
fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
