//! Headless engine binary for the Vivarium simulation.
//!
//! This is the main entry point that wires together configuration,
//! logging, the world simulation and the bounded runner. It runs the
//! simulation loop until a termination condition is met.
//!
//! # Usage
//!
//! ```text
//! vivarium-engine [CONFIG] [SAVE]
//! ```
//!
//! `CONFIG` defaults to `vivarium-config.yaml`; when that file is missing
//! the built-in defaults are used. When `SAVE` names an existing world save
//! it is loaded before the run, and the final world is written back to it
//! when the run ends.
//!
//! # Startup Sequence
//!
//! 1. Load configuration
//! 2. Initialize structured logging (tracing)
//! 3. Build the world and seed it (or load the save)
//! 4. Create operator state from simulation bounds
//! 5. Install the ctrl-c handler
//! 6. Run the simulation loop
//! 7. Log the result and write the save

mod error;
mod progress_callback;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vivarium_core::config::LoggingConfig;
use vivarium_core::{OperatorState, SimulationConfig, WorldSimulation, run_simulation};

use crate::error::EngineError;
use crate::progress_callback::ProgressCallback;

/// Config file read when no path is given.
const DEFAULT_CONFIG_PATH: &str = "vivarium-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let save_path = args.next().map(PathBuf::from);

    // 1. Load configuration.
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        config = %config_path.display(),
        cols = config.world.cols,
        rows = config.world.rows,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        extinction_policy = ?config.world.extinction_policy,
        "vivarium-engine starting"
    );

    // 3. Build the world.
    let seed = config.world.seed;
    let tick_interval_ms = config.world.tick_interval_ms;
    let report_interval = config.statistics.sample_interval;
    let bounds = config.simulation.clone();
    let mut world = WorldSimulation::headless(config)?;
    world.reset(seed);
    if let Some(path) = save_path.as_deref().filter(|path| path.exists()) {
        load_save(&mut world, path)?;
    }
    let status = world.status();
    info!(
        tick = status.tick,
        population = status.population,
        species = status.species_count,
        "World ready"
    );

    // 4. Create operator state.
    let operator = Arc::new(OperatorState::new(tick_interval_ms, &bounds));

    // 5. Ctrl-c ends the run at the next tick boundary.
    let signal_operator = Arc::clone(&operator);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                signal_operator.request_shutdown();
            }
            Err(e) => warn!(error = %e, "failed to listen for interrupt"),
        }
    });

    // 6. Run the simulation.
    let mut callback = ProgressCallback::new(report_interval);
    let result = run_simulation(&mut world, &operator, &mut callback).await?;

    // 7. Log results.
    vivarium_core::runner::log_simulation_end(&result);
    let status = operator.status(world.status()).await;
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        tick = status.world.tick,
        elapsed_ms = status.world.elapsed_ms,
        population = status.world.population,
        species = status.world.species_count,
        resets = status.world.reset_count,
        elapsed_seconds = status.elapsed_seconds,
        "vivarium-engine shutdown complete"
    );

    if let Some(path) = save_path.as_deref() {
        write_save(&world, path)?;
    }

    Ok(())
}

/// Load the simulation configuration.
///
/// A missing file falls back to the defaults; an unreadable or invalid one
/// is an error.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter {:?}: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

fn load_save(world: &mut WorldSimulation, path: &Path) -> Result<(), EngineError> {
    let json = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    world.load_json(&json)?;
    info!(path = %path.display(), "World save loaded");
    Ok(())
}

fn write_save(world: &WorldSimulation, path: &Path) -> Result<(), EngineError> {
    let json = world.save().to_json()?;
    std::fs::write(path, json).map_err(|source| EngineError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "World save written");
    Ok(())
}
