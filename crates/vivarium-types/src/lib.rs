//! Shared type definitions for the Vivarium simulation.
//!
//! This crate is the single source of truth for the small value types used
//! across the Vivarium workspace: compass directions and their rotation
//! rules, the closed set of cell kinds, brain decisions, typed identifiers,
//! and the observation payload produced by eye cells.
//!
//! # Modules
//!
//! - [`direction`] -- 8-way compass directions, offsets, rotation, and the
//!   4-bucket body facing used for anatomy rotation
//! - [`enums`] -- Cell kinds, brain decisions, and the organism environment tag
//! - [`ids`] -- Type-safe identifier wrappers for organisms and species
//! - [`perception`] -- The observation payload recorded by eye cells

pub mod direction;
pub mod enums;
pub mod ids;
pub mod perception;

// Re-export all public types at crate root for convenience.
pub use direction::{BodyFacing, Direction, Offset};
pub use enums::{CellKind, Decision, Environment, UnknownCellKind};
pub use ids::{OrganismId, SpeciesId};
pub use perception::Observation;
