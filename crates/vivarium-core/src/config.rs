//! Configuration loading and typed config structures for the Vivarium simulation.
//!
//! The canonical configuration lives in `vivarium-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure and a loader that reads and validates the file. The `engine`
//! section is the [`EngineConfig`] snapshot that can be re-applied to a
//! running world between ticks.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vivarium_organisms::{EngineConfig, OrganismError};
use vivarium_world::MAX_GRID_CELLS;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The engine snapshot is outside its accepted domain.
    #[error("invalid engine configuration: {source}")]
    Invalid {
        /// The underlying validation error.
        #[from]
        source: OrganismError,
    },

    /// A world, statistics or bounds value is outside its accepted domain.
    #[error("invalid configuration value `{field}`: {reason}")]
    Value {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `vivarium-config.yaml`. Every field has a
/// default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid size, seed, timing and extinction handling.
    #[serde(default)]
    pub world: WorldConfig,

    /// Organism behavior parameters.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Fossil record and statistics settings.
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error from [`validate`](Self::validate).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error from [`validate`](Self::validate).
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every section against its accepted domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a bad engine snapshot and
    /// [`ConfigError::Value`] for any other out-of-domain field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.cols == 0 || self.world.rows == 0 {
            return Err(ConfigError::Value {
                field: "world.cols",
                reason: format!(
                    "grid must be at least 1x1, got {}x{}",
                    self.world.cols, self.world.rows
                ),
            });
        }
        if u64::from(self.world.cols).saturating_mul(u64::from(self.world.rows)) > MAX_GRID_CELLS {
            return Err(ConfigError::Value {
                field: "world.cols",
                reason: format!(
                    "grid {}x{} exceeds {MAX_GRID_CELLS} cells",
                    self.world.cols, self.world.rows
                ),
            });
        }
        if self.statistics.record_window == 0 {
            return Err(ConfigError::Value {
                field: "statistics.record_window",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.statistics.sample_interval == 0 {
            return Err(ConfigError::Value {
                field: "statistics.sample_interval",
                reason: "must be at least 1".to_owned(),
            });
        }
        self.engine.validate()?;
        Ok(())
    }
}

/// What the simulation does when the last organism dies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtinctionPolicy {
    /// Keep ticking an empty world.
    Continue,
    /// Stop the tick loop.
    Pause,
    /// Clear the world and seed a new origin organism.
    #[default]
    Reset,
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid width in cells.
    #[serde(default = "default_cols")]
    pub cols: u32,

    /// Grid height in cells.
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Milliseconds per tick, both simulated and real-time pacing.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Reaction to total extinction.
    #[serde(default)]
    pub extinction_policy: ExtinctionPolicy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            rows: default_rows(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            extinction_policy: ExtinctionPolicy::default(),
        }
    }
}

/// Fossil record and statistics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Samples kept in the rolling series.
    #[serde(default = "default_record_window")]
    pub record_window: usize,

    /// Extinct species with a smaller cumulative population are discarded.
    #[serde(default = "default_min_retained_population")]
    pub min_retained_population: u64,

    /// Ticks between statistics samples.
    #[serde(default = "default_sample_interval")]
    pub sample_interval: u64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            record_window: default_record_window(),
            min_retained_population: default_min_retained_population(),
            sample_interval: default_sample_interval(),
        }
    }
}

/// Simulation boundary configuration.
///
/// A value of 0 for either limit means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_cols() -> u32 {
    120
}

const fn default_rows() -> u32 {
    80
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    16
}

const fn default_record_window() -> usize {
    vivarium_ledger::DEFAULT_RECORD_WINDOW
}

const fn default_min_retained_population() -> u64 {
    vivarium_ledger::DEFAULT_MIN_RETAINED_POPULATION
}

const fn default_sample_interval() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vivarium_types::Offset;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.extinction_policy, ExtinctionPolicy::Reset);
        assert_eq!(config.statistics.record_window, 500);
        assert_eq!(config.engine.lifespan_multiplier, 100);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  cols: 60
  rows: 40
  seed: 123
  tick_interval_ms: 50
  extinction_policy: pause

engine:
  lifespan_multiplier: 50
  food_production_probability: 12.5
  insta_kill: true
  edible_neighbors:
    - { x: 1, y: 0 }
    - { x: -1, y: 0 }

statistics:
  record_window: 100
  min_retained_population: 3
  sample_interval: 5

simulation:
  max_ticks: 1000
  max_real_time_seconds: 60

logging:
  level: debug
  json: true
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.cols, 60);
        assert_eq!(config.world.extinction_policy, ExtinctionPolicy::Pause);
        assert_eq!(config.engine.lifespan_multiplier, 50);
        assert!(config.engine.insta_kill);
        assert_eq!(
            config.engine.edible_neighbors,
            vec![Offset::new(1, 0), Offset::new(-1, 0)]
        );
        assert_eq!(config.statistics.sample_interval, 5);
        assert_eq!(config.simulation.max_ticks, 1000);
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n").unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.cols, 120);
        assert_eq!(config.statistics.sample_interval, 10);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_engine_values_are_rejected() {
        let yaml = "engine:\n  food_production_probability: 140\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn zero_sized_world_is_rejected() {
        let yaml = "world:\n  cols: 0\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Value { field: "world.cols", .. })
        ));
    }

    #[test]
    fn oversized_world_is_rejected() {
        let yaml = "world:\n  cols: 2000000000\n  rows: 2000000000\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Value { field: "world.cols", .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("vivarium-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
