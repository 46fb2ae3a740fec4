//! Species records.
//!
//! A [`Species`] is created when a mutated child is born (or when a seed
//! organism is injected). It keeps a census of the anatomy that founded
//! it, a link to its ancestor species, and population counters.

use std::collections::BTreeMap;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use vivarium_organisms::{Anatomy, AnatomyRecord};
use vivarium_types::{CellKind, SpeciesId};

/// Length of a generated species name.
pub const SPECIES_NAME_LEN: usize = 10;

/// Snapshot of the anatomy that founded a species.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeciesCensus {
    /// The founding anatomy's cells.
    pub cells: AnatomyRecord,
    /// Cell count per kind. Kinds with no cells are omitted.
    pub counts: BTreeMap<CellKind, u32>,
}

impl SpeciesCensus {
    /// Take a census of `anatomy`.
    pub fn of(anatomy: &Anatomy) -> Self {
        let counts = CellKind::LIVING
            .iter()
            .filter(|kind| anatomy.has(**kind))
            .map(|kind| (*kind, anatomy.count(*kind)))
            .collect();
        Self {
            cells: anatomy.to_record(),
            counts,
        }
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> u32 {
        self.counts.values().fold(0_u32, |acc, n| acc.saturating_add(*n))
    }
}

/// One species in the fossil record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    /// Arena key.
    pub id: SpeciesId,
    /// Random opaque name.
    pub name: String,
    /// Founding anatomy census.
    pub census: SpeciesCensus,
    /// Species this one descends from. Severed on fossilization.
    #[serde(skip)]
    pub ancestor: Option<SpeciesId>,
    /// Living members.
    pub population: u32,
    /// Members ever born, including the founder.
    pub cumulative_population: u64,
    /// Tick the species appeared.
    pub start_tick: u64,
    /// Tick the last member died.
    pub end_tick: Option<u64>,
    /// Whether the species has no living members.
    pub extinct: bool,
}

impl Species {
    /// Found a species with a single member.
    pub fn new(
        id: SpeciesId,
        name: String,
        anatomy: &Anatomy,
        ancestor: Option<SpeciesId>,
        tick: u64,
    ) -> Self {
        Self {
            id,
            name,
            census: SpeciesCensus::of(anatomy),
            ancestor,
            population: 1,
            cumulative_population: 1,
            start_tick: tick,
            end_tick: None,
            extinct: false,
        }
    }

    /// Record one birth into this species.
    pub fn add_population(&mut self) {
        self.population = self.population.saturating_add(1);
        self.cumulative_population = self.cumulative_population.saturating_add(1);
    }

    /// Record one death. Returns whether the population reached zero.
    pub fn decrease_population(&mut self) -> bool {
        self.population = self.population.saturating_sub(1);
        self.population == 0
    }
}

/// Draw a random alphanumeric species name.
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SPECIES_NAME_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vivarium_organisms::GrowthPlan;

    use super::*;

    #[test]
    fn names_are_ten_alphanumerics_and_seeded() {
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);
        let name = random_name(&mut a);
        assert_eq!(name.len(), SPECIES_NAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(name, random_name(&mut b));
    }

    #[test]
    fn census_copies_the_founding_anatomy() {
        let anatomy = GrowthPlan::origin().grow();
        let census = SpeciesCensus::of(&anatomy);
        assert_eq!(census.cell_count(), 3);
        assert_eq!(census.counts.get(&CellKind::Producer), Some(&2));
        assert_eq!(census.counts.get(&CellKind::Eye), None);
        assert_eq!(census.cells.cells.len(), 3);
    }

    #[test]
    fn population_counters() {
        let anatomy = GrowthPlan::origin().grow();
        let mut species = Species::new(SpeciesId(0), "abc".to_owned(), &anatomy, None, 7);
        species.add_population();
        assert_eq!(species.population, 2);
        assert_eq!(species.cumulative_population, 2);
        assert!(!species.decrease_population());
        assert!(species.decrease_population());
        assert!(species.decrease_population());
        assert_eq!(species.population, 0);
        assert_eq!(species.cumulative_population, 2);
    }
}
