//! Death conditions for organisms.
//!
//! An organism dies when:
//! - its age exceeds `cell_count * lifespan_multiplier`
//! - its accumulated damage reaches its cell count (or any hit lands while
//!   `insta_kill` is on)
//! - the world kills it externally (kill-all, reset)
//!
//! On death every grid cell the organism owns becomes food with no owner;
//! see [`Organism::die`](crate::Organism::die).

use crate::config::EngineConfig;
use crate::organism::Organism;

/// Why an organism died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Age exceeded the organism's lifespan.
    OldAge,
    /// Damage from killer cells reached the lethal threshold.
    Injury,
    /// Removed by a world-level command.
    External,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OldAge => write!(f, "old_age"),
            Self::Injury => write!(f, "injury"),
            Self::External => write!(f, "external"),
        }
    }
}

/// Check whether an organism meets a natural death condition.
///
/// Only inspects state; it never mutates the organism or the grid.
pub fn check_death(organism: &Organism, config: &EngineConfig) -> Option<DeathCause> {
    if organism.age > organism.lifespan(config) {
        return Some(DeathCause::OldAge);
    }
    if organism.damage > 0
        && (config.insta_kill || organism.damage >= organism.anatomy.cell_count())
    {
        return Some(DeathCause::Injury);
    }
    None
}

#[cfg(test)]
mod tests {
    use vivarium_types::{Offset, OrganismId};

    use super::*;
    use crate::growth::GrowthPlan;

    fn origin() -> Organism {
        Organism::new(OrganismId(1), Offset::new(5, 5), GrowthPlan::origin().grow())
    }

    #[test]
    fn healthy_organism_is_alive() {
        assert_eq!(check_death(&origin(), &EngineConfig::default()), None);
    }

    #[test]
    fn old_age_is_strictly_after_lifespan() {
        let config = EngineConfig::default();
        let mut org = origin();
        org.age = 300;
        assert_eq!(check_death(&org, &config), None);
        org.age = 301;
        assert_eq!(check_death(&org, &config), Some(DeathCause::OldAge));
    }

    #[test]
    fn damage_threshold_is_cell_count() {
        let config = EngineConfig::default();
        let mut org = origin();
        org.damage = 2;
        assert_eq!(check_death(&org, &config), None);
        org.damage = 3;
        assert_eq!(check_death(&org, &config), Some(DeathCause::Injury));
    }

    #[test]
    fn insta_kill_makes_any_damage_lethal() {
        let config = EngineConfig {
            insta_kill: true,
            ..EngineConfig::default()
        };
        let mut org = origin();
        org.damage = 1;
        assert_eq!(check_death(&org, &config), Some(DeathCause::Injury));
    }

    #[test]
    fn display_names() {
        assert_eq!(DeathCause::OldAge.to_string(), "old_age");
        assert_eq!(DeathCause::External.to_string(), "external");
    }
}
