//! Engine parameters that drive organism behavior.
//!
//! [`EngineConfig`] is the configuration snapshot applied to a running
//! simulation. It appears under the `engine` key of `vivarium-config.yaml`
//! and can be swapped between ticks; [`EngineConfig::validate`] runs before
//! any new snapshot replaces the current one.
//!
//! All probabilities are percentages in `0.0..=100.0`. A roll succeeds when
//! a uniform draw from `0.0..100.0` falls strictly below the probability, so
//! 0 never fires and 100 always does.

use serde::{Deserialize, Serialize};
use vivarium_types::Offset;

use crate::error::OrganismError;

/// Largest Chebyshev distance a configured neighbor offset may have.
pub const MAX_NEIGHBOR_REACH: u32 = 3;

/// Tunable parameters for organism behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// An organism dies of old age once `age > cell_count * lifespan_multiplier`.
    #[serde(default = "default_lifespan_multiplier")]
    pub lifespan_multiplier: u32,

    /// Percent chance per tick that a producer cell grows food.
    #[serde(default = "default_food_production_probability")]
    pub food_production_probability: f64,

    /// Offsets (relative to a killer cell) that a killer harms.
    #[serde(default = "default_neighbors")]
    pub killable_neighbors: Vec<Offset>,

    /// Offsets (relative to a mouth cell) that a mouth eats from.
    #[serde(default = "default_neighbors")]
    pub edible_neighbors: Vec<Offset>,

    /// Offsets (relative to a producer cell) where food may grow.
    #[serde(default = "default_neighbors")]
    pub growable_neighbors: Vec<Offset>,

    /// When set, every birth uses `global_mutability` as its mutation chance.
    #[serde(default)]
    pub use_global_mutability: bool,

    /// Percent mutation chance used when `use_global_mutability` is set.
    #[serde(default = "default_global_mutability")]
    pub global_mutability: u32,

    /// Percent chance that a mutation adds a cell.
    #[serde(default = "default_mutation_probability")]
    pub add_probability: f64,

    /// Percent chance that a mutation changes a cell's kind.
    #[serde(default = "default_mutation_probability")]
    pub change_probability: f64,

    /// Percent chance that a mutation removes a cell.
    #[serde(default = "default_mutation_probability")]
    pub remove_probability: f64,

    /// Whether children are born with a random body orientation.
    #[serde(default = "default_true")]
    pub rotation_enabled: bool,

    /// Whether food cells block a child's footprint at birth.
    #[serde(default = "default_true")]
    pub food_blocks_reproduction: bool,

    /// Whether producer cells work on organisms that also have movers.
    #[serde(default)]
    pub movers_can_produce: bool,

    /// A single hit kills, and striking a killer cell hits back.
    #[serde(default)]
    pub insta_kill: bool,

    /// Maximum number of cells an eye ray travels.
    #[serde(default = "default_look_range")]
    pub look_range: u32,

    /// Whether eye rays pass through the looking organism's own cells.
    #[serde(default)]
    pub see_through_self: bool,

    /// Percent chance per attempt that food appears on a random empty cell.
    #[serde(default)]
    pub food_drop_probability: f64,

    /// Extra food an organism with a mover cell needs before it reproduces.
    #[serde(default)]
    pub extra_mover_food_cost: u32,

    /// When a lineage gains its first eye, also redraw the reactions to
    /// food, killers and brains.
    #[serde(default)]
    pub randomize_all_decisions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lifespan_multiplier: default_lifespan_multiplier(),
            food_production_probability: default_food_production_probability(),
            killable_neighbors: default_neighbors(),
            edible_neighbors: default_neighbors(),
            growable_neighbors: default_neighbors(),
            use_global_mutability: false,
            global_mutability: default_global_mutability(),
            add_probability: default_mutation_probability(),
            change_probability: default_mutation_probability(),
            remove_probability: default_mutation_probability(),
            rotation_enabled: true,
            food_blocks_reproduction: true,
            movers_can_produce: false,
            insta_kill: false,
            look_range: default_look_range(),
            see_through_self: false,
            food_drop_probability: 0.0,
            extra_mover_food_cost: 0,
            randomize_all_decisions: false,
        }
    }
}

impl EngineConfig {
    /// Check every value against its accepted domain.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), OrganismError> {
        if self.lifespan_multiplier == 0 {
            return Err(invalid("lifespan_multiplier", "must be at least 1"));
        }
        if self.look_range == 0 {
            return Err(invalid("look_range", "must be at least 1"));
        }
        if self.global_mutability > 100 {
            return Err(invalid("global_mutability", "must be within 0..=100"));
        }

        for (field, value) in [
            ("food_production_probability", self.food_production_probability),
            ("add_probability", self.add_probability),
            ("change_probability", self.change_probability),
            ("remove_probability", self.remove_probability),
            ("food_drop_probability", self.food_drop_probability),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(invalid(field, &format!("{value} is not a percentage")));
            }
        }

        for (field, offsets) in [
            ("killable_neighbors", &self.killable_neighbors),
            ("edible_neighbors", &self.edible_neighbors),
            ("growable_neighbors", &self.growable_neighbors),
        ] {
            if offsets.is_empty() {
                return Err(invalid(field, "must name at least one offset"));
            }
            if let Some(bad) = offsets
                .iter()
                .find(|o| o.is_origin() || o.chebyshev() > MAX_NEIGHBOR_REACH)
            {
                return Err(invalid(
                    field,
                    &format!("offset {bad} must be non-zero and within {MAX_NEIGHBOR_REACH} cells"),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> OrganismError {
    OrganismError::InvalidConfig {
        field,
        reason: reason.to_owned(),
    }
}

/// Roll a percentage chance. `0.0` never succeeds, `100.0` always does.
pub fn roll_percent<R: rand::Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.random_range(0.0..100.0) < probability
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_lifespan_multiplier() -> u32 {
    100
}

const fn default_food_production_probability() -> f64 {
    5.0
}

fn default_neighbors() -> Vec<Offset> {
    vec![
        Offset::new(1, 0),
        Offset::new(0, 1),
        Offset::new(-1, 0),
        Offset::new(0, -1),
    ]
}

const fn default_global_mutability() -> u32 {
    5
}

const fn default_mutation_probability() -> f64 {
    33.0
}

const fn default_true() -> bool {
    true
}

const fn default_look_range() -> u32 {
    20
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: EngineConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_named_fields() {
        let yaml = "
lifespan_multiplier: 10
insta_kill: true
edible_neighbors:
  - { x: 1, y: 1 }
";
        let config: EngineConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.lifespan_multiplier, 10);
        assert!(config.insta_kill);
        assert_eq!(config.edible_neighbors, vec![Offset::new(1, 1)]);
        assert_eq!(config.look_range, 20);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let config = EngineConfig {
            add_probability: 150.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OrganismError::InvalidConfig { field: "add_probability", .. })
        ));

        let config = EngineConfig {
            food_drop_probability: -1.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_neighbor_sets_are_rejected() {
        let config = EngineConfig {
            edible_neighbors: Vec::new(),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            killable_neighbors: vec![Offset::ORIGIN],
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            growable_neighbors: vec![Offset::new(4, 0)],
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_counters_are_rejected() {
        for config in [
            EngineConfig {
                lifespan_multiplier: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                look_range: 0,
                ..EngineConfig::default()
            },
        ] {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn roll_percent_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(!roll_percent(&mut rng, 0.0));
            assert!(roll_percent(&mut rng, 100.0));
        }
    }
}
