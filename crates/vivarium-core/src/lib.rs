//! World clock, tick cycle, and orchestration for the Vivarium simulation.
//!
//! This crate owns the [`WorldSimulation`]: the grid, the organisms, the
//! fossil record and the seeded random stream, plus the loop and controls
//! that drive it.
//!
//! # Modules
//!
//! - [`clock`] -- World clock with tick counter and simulated time.
//! - [`config`] -- Configuration loading from `vivarium-config.yaml` into
//!   strongly-typed structs.
//! - [`tick`] -- The tick cycle and world-level commands.
//! - [`snapshot`] -- Full world save and load.
//! - [`operator`] -- Shared stop/start, speed and command state.
//! - [`runner`] -- Bounded async loop around [`WorldSimulation::step`].

pub mod clock;
pub mod config;
pub mod operator;
pub mod runner;
pub mod snapshot;
pub mod tick;

pub use clock::{ClockError, WorldClock};
pub use config::{ConfigError, ExtinctionPolicy, SimulationConfig};
pub use operator::{OperatorCommand, OperatorState, SimulationEndReason, SimulationStatus};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use snapshot::{SnapshotError, WorldRecord};
pub use tick::{TickError, TickSummary, WorldSimulation, WorldStatus};
