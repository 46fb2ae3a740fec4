//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: vivarium_core::ConfigError,
    },

    /// The world could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying tick error.
        #[from]
        source: vivarium_core::TickError,
    },

    /// A world save could not be read or applied.
    #[error("save error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: vivarium_core::SnapshotError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: vivarium_core::RunnerError,
    },

    /// Reading or writing a save file failed.
    #[error("save file {path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The log filter could not be installed.
    #[error("logging setup failed: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
