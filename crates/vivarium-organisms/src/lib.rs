//! Organisms for the Vivarium simulation.
//!
//! This crate holds everything that operates on a single organism: its body
//! plan, the per-tick behavior of each cell kind, the decision policy, and
//! the reproduction and mutation rules. It mutates the grid it is handed
//! but never owns world state; the tick loop in `vivarium-core` drives it.
//!
//! # Modules
//!
//! - [`anatomy`] -- Body cells, per-kind aggregates, and the anatomy record ([`Anatomy`])
//! - [`behavior`] -- Per-cell tick dispatch ([`on_tick`], [`CellContext`], [`Strike`])
//! - [`brain`] -- Decision policy over observations ([`BrainPolicy`])
//! - [`config`] -- The engine configuration snapshot ([`EngineConfig`])
//! - [`death`] -- Death conditions ([`DeathCause`])
//! - [`error`] -- Error types ([`OrganismError`])
//! - [`growth`] -- Scripted anatomies ([`GrowthPlan`])
//! - [`organism`] -- Organism state, placement, harm and death ([`Organism`])
//! - [`reproduction`] -- Offspring, mutation and placement ([`reproduce`])

pub mod anatomy;
pub mod behavior;
pub mod brain;
pub mod config;
pub mod death;
pub mod error;
pub mod growth;
pub mod organism;
pub mod reproduction;

// Re-export primary types at crate root for convenience.
pub use anatomy::{AddMode, Anatomy, AnatomyRecord, BodyCell, CellRecord};
pub use behavior::{CellContext, Strike, on_tick};
pub use brain::BrainPolicy;
pub use config::{EngineConfig, roll_percent};
pub use death::{DeathCause, check_death};
pub use error::OrganismError;
pub use growth::{GrowthPlan, GrowthStep};
pub use organism::{Lifecycle, Organism, OrganismRecord};
pub use reproduction::{Birth, mutate_body, reproduce};
