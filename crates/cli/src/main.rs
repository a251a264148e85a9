#![deny(unsafe_code)]
//! CLI binary for the curlflow particle kernel.
//!
//! Subcommands:
//! - `run`: tick a simulation headlessly, print a summary, optionally write a snapshot
//! - `schema`: print the parameter schema

mod error;

use clap::{Parser, Subcommand};
use curlflow_core::{Kernel, PointerInput, RunSpec, TickInput};
use curlflow_sim::{snapshot, Simulation, SimulationConfig};
use error::CliError;
use glam::DVec3;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "curlflow", about = "Curl-noise particle simulation CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tick a simulation N times and report where the particles ended up.
    Run {
        /// Particles per row.
        #[arg(short = 'W', long, default_value_t = 128)]
        width: usize,

        /// Rows of particles.
        #[arg(short = 'H', long, default_value_t = 128)]
        height: usize,

        /// Number of ticks.
        #[arg(short, long, default_value_t = 600)]
        ticks: usize,

        /// Fixed delta time per tick, in seconds.
        #[arg(long, default_value_t = RunSpec::DEFAULT_DT)]
        dt: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Simulation parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Run spec JSON file; overrides the options above.
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Pointer held for the whole run, as `x,y,z` or `x,y,z,strength`.
        #[arg(long)]
        pointer: Option<String>,

        /// Write a JSON snapshot of the final state here.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the simulation parameter schema.
    Schema,
}

/// Parses `x,y,z` or `x,y,z,strength`; strength defaults to 1.
fn parse_pointer(text: &str) -> Result<PointerInput, CliError> {
    let parts = text
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::pointer(text, e.to_string()))?;
    let (position, strength) = match parts.as_slice() {
        [x, y, z] => (DVec3::new(*x, *y, *z), 1.0),
        [x, y, z, s] => (DVec3::new(*x, *y, *z), *s),
        _ => return Err(CliError::pointer(text, "expected x,y,z or x,y,z,strength")),
    };
    Ok(PointerInput { position, strength })
}

/// Folds the grid size into the params object; explicit dimensions win.
fn merged_params(spec: &RunSpec) -> Value {
    let mut params = spec.params.clone();
    if let Some(map) = params.as_object_mut() {
        map.insert("grid_width".into(), json!(spec.width));
        map.insert("grid_height".into(), json!(spec.height));
    }
    params
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&SimulationConfig::schema())?);
        }
        Command::Run {
            width,
            height,
            ticks,
            dt,
            seed,
            params,
            spec,
            pointer,
            output,
        } => {
            let spec = match spec {
                Some(path) => {
                    RunSpec::load(&path).map_err(|source| CliError::RunSpec { path, source })?
                }
                None => {
                    let params: Value = serde_json::from_str(&params)
                        .map_err(|e| CliError::Params(e.to_string()))?;
                    let spec = RunSpec {
                        params,
                        ticks,
                        dt,
                        ..RunSpec::new(width, height, seed)
                    };
                    spec.validate()?;
                    spec
                }
            };
            let pointer = pointer.as_deref().map(parse_pointer).transpose()?;
            log::info!("running {} ticks at dt {}", spec.ticks, spec.dt);

            let mut kernel: Box<dyn Kernel> =
                Box::new(Simulation::from_json(&merged_params(&spec), spec.seed)?);

            for i in 1..=spec.ticks {
                let input = TickInput {
                    dt: spec.dt,
                    elapsed_time: spec.dt * i as f64,
                    pointer,
                };
                kernel.tick(&input)?;
            }

            let reader = kernel.reader();
            if let Some(path) = &output {
                snapshot::write_json(reader, kernel.tick_count(), path).map_err(|source| {
                    CliError::Snapshot {
                        path: path.clone(),
                        source,
                    }
                })?;
            }

            let (min, max) = reader.bounds();
            let mean_speed = reader.mean_speed();
            if cli.json {
                let info = json!({
                    "width": spec.width,
                    "height": spec.height,
                    "particles": reader.len(),
                    "ticks": kernel.tick_count(),
                    "seed": spec.seed,
                    "bounds": {"min": [min.x, min.y, min.z], "max": [max.x, max.y, max.z]},
                    "mean_speed": mean_speed,
                    "output": output.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "ran {} ticks ({} particles, seed {}): bounds {min} .. {max}, mean speed {mean_speed:.4}",
                    kernel.tick_count(),
                    reader.len(),
                    spec.seed
                );
                if let Some(path) = &output {
                    eprintln!("snapshot -> {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
