#![deny(unsafe_code)]
//! Core types and traits for the curlflow particle kernel.
//!
//! Provides the `Kernel` trait and its tick inputs, the double-buffered
//! `StateBuffer` with its read-only `StateReader`, `ParticleCell` and
//! `SpawnVolume`, the `FlowField` trait with `CurlNoise`, the `Xorshift64`
//! PRNG, `RunSpec`, and parameter helpers.

pub mod cell;
pub mod error;
pub mod flow;
pub mod kernel;
pub mod params;
pub mod prng;
pub mod reader;
pub mod run_spec;
pub mod state;

pub use cell::{ParticleCell, SpawnVolume};
pub use error::SimError;
pub use flow::{CurlNoise, FlowField, StillField};
pub use kernel::{Kernel, PointerInput, TickInput, TickOutcome};
pub use prng::Xorshift64;
pub use reader::StateReader;
pub use run_spec::RunSpec;
pub use state::StateBuffer;
