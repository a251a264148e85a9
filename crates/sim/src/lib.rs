#![deny(unsafe_code)]
//! Curl-noise particle simulation.
//!
//! A [`Simulation`] advances a grid of particles through a divergence-free
//! curl-noise field with gravity, damping, optional pointer attraction and a
//! boundary policy. It implements [`curlflow_core::Kernel`]; each tick is a
//! parallel velocity pass, a parallel position pass and a buffer swap.

pub mod boundary;
pub mod clock;
pub mod config;
pub mod forces;
pub mod integrator;
pub mod simulation;
pub mod snapshot;

pub use boundary::{Axis, BoundaryPolicy};
pub use clock::{SimulationClock, TickTime};
pub use config::SimulationConfig;
pub use forces::{ForceComposer, ForceUpdate, TickContext};
pub use integrator::{CellEvent, Integrator, PassStats, Phase};
pub use simulation::Simulation;
