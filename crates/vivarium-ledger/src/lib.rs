//! Species and fossil record bookkeeping for the Vivarium simulation.
//!
//! Every living organism belongs to a species. Species are born when a
//! mutated child is placed, tracked while they have living members, and
//! fossilized when the last member dies. The record also keeps a rolling
//! series of population statistics.
//!
//! # Modules
//!
//! - [`species`] -- The [`Species`] record and its founding census.
//! - [`fossil`] -- The [`FossilRecord`] arena: registration, population
//!   counting, fossilization, resurrection, and serialization.
//! - [`stats`] -- [`StatsSample`] and the bounded [`StatsSeries`].
//!
//! # Population invariant
//!
//! For every extant species S:
//!
//! ```text
//! S.population == count(living organisms whose species key is S)
//! ```
//!
//! [`FossilRecord::verify_populations`] checks it against a census taken
//! from the world. The record never panics; it returns errors.

pub mod fossil;
pub mod species;
pub mod stats;

use vivarium_types::SpeciesId;

pub use fossil::{DEFAULT_MIN_RETAINED_POPULATION, FossilRecord, FossilRecordRecord};
pub use species::{SPECIES_NAME_LEN, Species, SpeciesCensus, random_name};
pub use stats::{DEFAULT_RECORD_WINDOW, StatsSample, StatsSeries};

/// Errors that can occur in fossil record operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A species' recorded population disagrees with the world census.
    #[error("species {species} records {recorded} members but {live} are alive")]
    PopulationMismatch {
        /// The species in question.
        species: SpeciesId,
        /// Population held by the fossil record.
        recorded: u32,
        /// Members counted in the world.
        live: u32,
    },

    /// A serialized record lists the same species twice.
    #[error("species {species} appears more than once in the fossil record")]
    DuplicateSpecies {
        /// The repeated key.
        species: SpeciesId,
    },

    /// A serialized statistics series has a zero-sample window.
    #[error("statistics window must hold at least one sample")]
    EmptyWindow,

    /// The payload is not valid JSON for the expected structure.
    #[error("malformed fossil record: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
