//! The fossil record: arena of extant and extinct species.
//!
//! Species are keyed by [`SpeciesId`]; organisms hold the key, never the
//! species itself. When a species' population reaches zero it is
//! fossilized: its ancestor link is severed, its end tick is recorded, and
//! it is either retained in the extinct map or discarded when its
//! cumulative population never reached `min_retained_population`.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vivarium_organisms::Anatomy;
use vivarium_types::SpeciesId;

use crate::LedgerError;
use crate::species::{Species, random_name};
use crate::stats::{DEFAULT_RECORD_WINDOW, StatsSample, StatsSeries};

/// Default minimum cumulative population for an extinct species to be kept.
pub const DEFAULT_MIN_RETAINED_POPULATION: u64 = 10;

/// Species bookkeeping for one world.
#[derive(Debug, Clone, PartialEq)]
pub struct FossilRecord {
    extant: BTreeMap<SpeciesId, Species>,
    extinct: BTreeMap<SpeciesId, Species>,
    next_id: SpeciesId,
    min_retained_population: u64,
    series: StatsSeries,
}

impl Default for FossilRecord {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RETAINED_POPULATION, DEFAULT_RECORD_WINDOW)
    }
}

impl FossilRecord {
    /// Create an empty record.
    pub fn new(min_retained_population: u64, record_window: usize) -> Self {
        Self {
            extant: BTreeMap::new(),
            extinct: BTreeMap::new(),
            next_id: SpeciesId(0),
            min_retained_population,
            series: StatsSeries::new(record_window),
        }
    }

    /// Found a new extant species with one member.
    pub fn register_species<R: Rng + ?Sized>(
        &mut self,
        anatomy: &Anatomy,
        ancestor: Option<SpeciesId>,
        tick: u64,
        rng: &mut R,
    ) -> SpeciesId {
        let id = self.next_id;
        self.next_id = id.next();
        let species = Species::new(id, random_name(rng), anatomy, ancestor, tick);
        info!(
            species = %id,
            name = %species.name,
            ancestor = ?ancestor.map(SpeciesId::into_inner),
            cells = anatomy.cell_count(),
            tick,
            "species emerged"
        );
        self.extant.insert(id, species);
        id
    }

    /// Record a birth into an extant species. Returns `false` if unknown.
    pub fn add_population(&mut self, id: SpeciesId) -> bool {
        match self.extant.get_mut(&id) {
            Some(species) => {
                species.add_population();
                true
            }
            None => false,
        }
    }

    /// Record a death. Fossilizes the species when it empties.
    ///
    /// Returns whether the species went extinct.
    pub fn decrease_population(&mut self, id: SpeciesId, tick: u64) -> bool {
        let emptied = self
            .extant
            .get_mut(&id)
            .is_some_and(Species::decrease_population);
        if emptied {
            self.fossilize(id, tick);
        }
        emptied
    }

    /// Move an extant species out of play.
    ///
    /// Returns whether the species was retained in the extinct map.
    pub fn fossilize(&mut self, id: SpeciesId, tick: u64) -> bool {
        let Some(mut species) = self.extant.remove(&id) else {
            return false;
        };
        species.ancestor = None;
        species.extinct = true;
        species.end_tick = Some(tick);
        species.population = 0;
        let retained = species.cumulative_population >= self.min_retained_population;
        info!(
            species = %id,
            name = %species.name,
            cumulative = species.cumulative_population,
            retained,
            tick,
            "species extinct"
        );
        if retained {
            self.extinct.insert(id, species);
        }
        retained
    }

    /// Bring a retained extinct species back to the extant map.
    ///
    /// Returns `true` if the species is extant afterwards.
    pub fn resurrect(&mut self, id: SpeciesId) -> bool {
        if self.extant.contains_key(&id) {
            return true;
        }
        let Some(mut species) = self.extinct.remove(&id) else {
            return false;
        };
        species.extinct = false;
        species.end_tick = None;
        debug!(species = %id, name = %species.name, "species resurrected");
        self.extant.insert(id, species);
        true
    }

    /// Look a species up in either map.
    pub fn species(&self, id: SpeciesId) -> Option<&Species> {
        self.extant.get(&id).or_else(|| self.extinct.get(&id))
    }

    /// Whether `id` is extant.
    pub fn is_extant(&self, id: SpeciesId) -> bool {
        self.extant.contains_key(&id)
    }

    /// Extant species in key order.
    pub fn extant(&self) -> impl Iterator<Item = &Species> {
        self.extant.values()
    }

    /// Retained extinct species in key order.
    pub fn extinct(&self) -> impl Iterator<Item = &Species> {
        self.extinct.values()
    }

    /// Number of extant species.
    pub fn extant_count(&self) -> u32 {
        u32::try_from(self.extant.len()).unwrap_or(u32::MAX)
    }

    /// Number of retained extinct species.
    pub fn extinct_count(&self) -> usize {
        self.extinct.len()
    }

    /// The statistics series.
    pub const fn series(&self) -> &StatsSeries {
        &self.series
    }

    /// Append a statistics sample.
    pub fn record_sample(&mut self, sample: StatsSample) {
        self.series.push(sample);
    }

    /// Forget every species and sample. Identifiers keep counting up.
    pub fn clear(&mut self) {
        self.extant.clear();
        self.extinct.clear();
        self.series.clear();
    }

    /// Check that every extant population matches the number of living
    /// members counted in the world.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PopulationMismatch`] for the first species
    /// whose recorded population differs from `live`, including species
    /// present in only one of the two.
    pub fn verify_populations(&self, live: &BTreeMap<SpeciesId, u32>) -> Result<(), LedgerError> {
        for species in self.extant.values() {
            let counted = live.get(&species.id).copied().unwrap_or(0);
            if counted != species.population {
                return Err(LedgerError::PopulationMismatch {
                    species: species.id,
                    recorded: species.population,
                    live: counted,
                });
            }
        }
        if let Some((id, counted)) = live
            .iter()
            .find(|(id, count)| **count > 0 && !self.extant.contains_key(id))
        {
            return Err(LedgerError::PopulationMismatch {
                species: *id,
                recorded: 0,
                live: *counted,
            });
        }
        Ok(())
    }

    /// Serializable form of this record. Ancestor links are not saved.
    pub fn to_record(&self) -> FossilRecordRecord {
        FossilRecordRecord {
            next_id: self.next_id,
            min_retained_population: self.min_retained_population,
            extant: self.extant.values().cloned().collect(),
            extinct: self.extinct.values().cloned().collect(),
            series: self.series.clone(),
        }
    }

    /// Rebuild a record from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateSpecies`] if an id appears twice.
    pub fn from_record(record: FossilRecordRecord) -> Result<Self, LedgerError> {
        let mut extant = BTreeMap::new();
        let mut extinct = BTreeMap::new();
        let mut next_id = record.next_id;
        for (species, extinct_flag) in record
            .extant
            .into_iter()
            .map(|s| (s, false))
            .chain(record.extinct.into_iter().map(|s| (s, true)))
        {
            let id = species.id;
            if extant.contains_key(&id) || extinct.contains_key(&id) {
                return Err(LedgerError::DuplicateSpecies { species: id });
            }
            if id >= next_id {
                next_id = id.next();
            }
            if extinct_flag {
                extinct.insert(id, species);
            } else {
                extant.insert(id, species);
            }
        }
        Ok(Self {
            extant,
            extinct,
            next_id,
            min_retained_population: record.min_retained_population,
            series: record.series,
        })
    }
}

/// Serialized fossil record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FossilRecordRecord {
    /// Next species key to hand out.
    pub next_id: SpeciesId,
    /// Retention threshold for extinct species.
    #[serde(default = "default_min_retained_population")]
    pub min_retained_population: u64,
    /// Extant species.
    #[serde(default)]
    pub extant: Vec<Species>,
    /// Retained extinct species.
    #[serde(default)]
    pub extinct: Vec<Species>,
    /// Statistics series.
    #[serde(default)]
    pub series: StatsSeries,
}

const fn default_min_retained_population() -> u64 {
    DEFAULT_MIN_RETAINED_POPULATION
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vivarium_organisms::GrowthPlan;

    use super::*;

    fn record_with(min: u64) -> (FossilRecord, ChaCha8Rng) {
        (FossilRecord::new(min, 10), ChaCha8Rng::seed_from_u64(1))
    }

    #[test]
    fn register_hands_out_sequential_keys() {
        let (mut record, mut rng) = record_with(10);
        let anatomy = GrowthPlan::origin().grow();
        let a = record.register_species(&anatomy, None, 0, &mut rng);
        let b = record.register_species(&anatomy, Some(a), 5, &mut rng);
        assert_eq!(a, SpeciesId(0));
        assert_eq!(b, SpeciesId(1));
        assert_eq!(record.species(b).unwrap().ancestor, Some(a));
        assert_eq!(record.extant_count(), 2);
    }

    #[test]
    fn small_extinct_species_are_discarded() {
        let (mut record, mut rng) = record_with(10);
        let id = record.register_species(&GrowthPlan::origin().grow(), None, 0, &mut rng);
        assert!(record.decrease_population(id, 12));
        assert_eq!(record.extant_count(), 0);
        assert_eq!(record.extinct_count(), 0);
        assert!(record.species(id).is_none());
    }

    #[test]
    fn large_extinct_species_are_retained_without_ancestor() {
        let (mut record, mut rng) = record_with(2);
        let anatomy = GrowthPlan::origin().grow();
        let parent = record.register_species(&anatomy, None, 0, &mut rng);
        let id = record.register_species(&anatomy, Some(parent), 1, &mut rng);
        record.add_population(id);
        assert!(!record.decrease_population(id, 3));
        assert!(record.decrease_population(id, 4));

        let fossil = record.species(id).unwrap();
        assert!(fossil.extinct);
        assert_eq!(fossil.end_tick, Some(4));
        assert_eq!(fossil.ancestor, None);
        assert_eq!(fossil.cumulative_population, 2);
        assert!(!record.is_extant(id));
    }

    #[test]
    fn resurrection_moves_back_to_extant() {
        let (mut record, mut rng) = record_with(1);
        let id = record.register_species(&GrowthPlan::origin().grow(), None, 0, &mut rng);
        record.decrease_population(id, 2);
        assert!(record.resurrect(id));
        let species = record.species(id).unwrap();
        assert!(!species.extinct);
        assert_eq!(species.end_tick, None);
        assert!(record.is_extant(id));
        assert!(!record.resurrect(SpeciesId(99)));
    }

    #[test]
    fn population_check_detects_mismatch() {
        let (mut record, mut rng) = record_with(10);
        let id = record.register_species(&GrowthPlan::origin().grow(), None, 0, &mut rng);
        let mut live = BTreeMap::new();
        live.insert(id, 1);
        assert!(record.verify_populations(&live).is_ok());

        live.insert(id, 2);
        assert!(matches!(
            record.verify_populations(&live),
            Err(LedgerError::PopulationMismatch { recorded: 1, live: 2, .. })
        ));

        live.insert(id, 1);
        live.insert(SpeciesId(40), 1);
        assert!(record.verify_populations(&live).is_err());
    }

    #[test]
    fn record_roundtrip_drops_ancestors() {
        let (mut record, mut rng) = record_with(1);
        let anatomy = GrowthPlan::origin().grow();
        let a = record.register_species(&anatomy, None, 0, &mut rng);
        let b = record.register_species(&anatomy, Some(a), 1, &mut rng);
        record.decrease_population(a, 2);
        record.record_sample(StatsSample::default());

        let json = serde_json::to_string(&record.to_record()).unwrap();
        let loaded =
            FossilRecord::from_record(serde_json::from_str::<FossilRecordRecord>(&json).unwrap()).unwrap();
        assert_eq!(loaded.extant_count(), 1);
        assert_eq!(loaded.extinct_count(), 1);
        assert_eq!(loaded.species(b).unwrap().ancestor, None);
        assert_eq!(loaded.species(b).unwrap().name, record.species(b).unwrap().name);
        assert_eq!(loaded.series().len(), 1);
    }

    #[test]
    fn duplicate_species_are_rejected() {
        let (mut record, mut rng) = record_with(1);
        let id = record.register_species(&GrowthPlan::origin().grow(), None, 0, &mut rng);
        let mut serialized = record.to_record();
        let copy = record.species(id).unwrap().clone();
        serialized.extinct.push(copy);
        assert!(matches!(
            FossilRecord::from_record(serialized),
            Err(LedgerError::DuplicateSpecies { .. })
        ));
    }
}
