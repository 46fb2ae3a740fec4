//! Error types for the vivarium-organisms crate.
//!
//! Structural edits that break an invariant (placing a cell on an occupied
//! offset, removing the anchor) are not errors; they return `false` or
//! `None` and the caller carries on. Errors here cover configuration out of
//! domain and persisted anatomies that cannot be rebuilt.

use vivarium_types::{CellKind, Offset};

/// Errors that can occur when validating configuration or loading organisms.
#[derive(Debug, thiserror::Error)]
pub enum OrganismError {
    /// A configuration value lies outside its accepted domain.
    #[error("invalid engine configuration: {field}: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Description of why the value was rejected.
        reason: String,
    },

    /// A persisted anatomy has no cells.
    #[error("anatomy record has no cells")]
    EmptyAnatomy,

    /// A persisted anatomy has no cell at the anchor offset.
    #[error("anatomy record has no anchor cell at (0, 0)")]
    MissingAnchor,

    /// Two persisted cells share an offset.
    #[error("anatomy record has two cells at {offset}")]
    DuplicateCell {
        /// The shared offset.
        offset: Offset,
    },

    /// A persisted cell has a kind that cannot be part of a body.
    #[error("anatomy record places non-living kind {kind} at {offset}")]
    NonLivingCell {
        /// The rejected kind.
        kind: CellKind,
        /// Where it was recorded.
        offset: Offset,
    },

    /// The payload is not valid JSON for the expected structure.
    #[error("malformed anatomy record: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
