//! Error types for the `vivarium-world` crate.
//!
//! Out-of-bounds reads and writes are not errors: edge-of-world queries are
//! routine and return `None`/`false`. Errors here are reserved for grid
//! construction and for inconsistent serialized input.

/// Errors that can occur when constructing a grid.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The grid must have at least one column and one row.
    #[error("grid dimensions must be non-zero, got {cols}x{rows}")]
    ZeroSize {
        /// Requested column count.
        cols: u32,
        /// Requested row count.
        rows: u32,
    },

    /// The grid holds more cells than the engine allows.
    #[error("grid dimensions {cols}x{rows} exceed the maximum cell count")]
    TooLarge {
        /// Requested column count.
        cols: u32,
        /// Requested row count.
        rows: u32,
    },
}

/// Errors that can occur when loading a persisted grid.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The recorded dimensions cannot form a grid.
    #[error("invalid grid dimensions: {source}")]
    Dimensions {
        /// The underlying grid construction error.
        #[from]
        source: WorldError,
    },

    /// A recorded coordinate lies outside the recorded dimensions.
    #[error("{kind} cell at ({col}, {row}) is outside the {cols}x{rows} grid")]
    OutOfBounds {
        /// Which list the coordinate came from ("food" or "wall").
        kind: &'static str,
        /// Column of the offending coordinate.
        col: i32,
        /// Row of the offending coordinate.
        row: i32,
        /// Recorded column count.
        cols: u32,
        /// Recorded row count.
        rows: u32,
    },

    /// The same coordinate appears as both food and wall.
    #[error("cell at ({col}, {row}) is recorded as both food and wall")]
    Conflicting {
        /// Column of the offending coordinate.
        col: i32,
        /// Row of the offending coordinate.
        row: i32,
    },

    /// The payload is not valid JSON for the expected structure.
    #[error("malformed grid record: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
