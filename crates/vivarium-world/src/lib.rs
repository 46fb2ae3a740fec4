//! Grid, occupancy, and persistence for the Vivarium simulation.
//!
//! This crate models the physical world: a bounded 2-D grid of cells, each
//! holding a [`CellKind`] and an optional back-reference to the organism
//! body cell that occupies it. Every mutation is queued for the external
//! renderer through the [`RenderSink`] boundary.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid construction and persistence.
//! - [`grid`] -- [`WorldGrid`]: bounds-checked reads and writes, ownership
//!   tracking, and the changed-cell queue.
//! - [`persist`] -- Sparse `{cols, rows, food, walls}` encoding of a grid.
//! - [`render`] -- The [`RenderSink`] capability and stock sinks.
//!
//! [`CellKind`]: vivarium_types::CellKind

pub mod error;
pub mod grid;
pub mod persist;
pub mod render;

// Re-export primary types at crate root.
pub use error::{PersistError, WorldError};
pub use grid::{CellOwner, GridCell, MAX_GRID_CELLS, WorldGrid};
pub use persist::GridRecord;
pub use render::{ChangeLog, NullSink, RenderSink, flush_changes};
