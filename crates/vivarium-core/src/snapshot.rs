//! Full world saves.
//!
//! A [`WorldRecord`] bundles the sparse grid, every living organism, the
//! fossil record and the clock. Loading is all-or-nothing: the record is
//! rebuilt into fresh state and swapped in only when every organism has
//! been placed and every species accounted for. A failed load leaves the
//! running world untouched.
//!
//! The random stream is not part of a save; a loaded world continues with
//! the stream of the simulation it was loaded into.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vivarium_ledger::{FossilRecord, FossilRecordRecord, LedgerError};
use vivarium_organisms::{Organism, OrganismError, OrganismRecord};
use vivarium_types::{OrganismId, SpeciesId};
use vivarium_world::{GridRecord, PersistError};

use crate::clock::WorldClock;
use crate::tick::{WorldSimulation, census};

/// Errors that can occur when loading a world save.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The grid section is inconsistent.
    #[error("invalid grid: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: PersistError,
    },

    /// An organism's anatomy is invalid.
    #[error("invalid organism: {source}")]
    Organism {
        /// The underlying organism error.
        #[from]
        source: OrganismError,
    },

    /// The fossil record is inconsistent with the organisms.
    #[error("invalid fossil record: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// Two organisms share an id.
    #[error("organism {organism} appears more than once")]
    DuplicateOrganism {
        /// The repeated id.
        organism: OrganismId,
    },

    /// An organism does not fit where it was saved.
    #[error("organism {organism} collides with the grid at its saved position")]
    Collision {
        /// The organism that could not be placed.
        organism: OrganismId,
    },

    /// An organism names a species the fossil record does not know.
    #[error("organism {organism} belongs to unknown species {species}")]
    UnknownSpecies {
        /// The organism.
        organism: OrganismId,
        /// The species key it carries.
        species: SpeciesId,
    },

    /// The save is not valid JSON for the expected structure.
    #[error("malformed world save: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Serialized world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    /// Ticks since the last reset.
    pub tick: u64,
    /// Walls and food.
    pub grid: GridRecord,
    /// Living organisms in tick order.
    #[serde(default)]
    pub organisms: Vec<OrganismRecord>,
    /// Species and statistics.
    pub fossil_record: FossilRecordRecord,
    /// Next organism id to hand out.
    #[serde(default)]
    pub next_organism: OrganismId,
}

impl WorldRecord {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl WorldSimulation {
    /// Capture the world.
    pub fn save(&self) -> WorldRecord {
        WorldRecord {
            tick: self.clock.tick(),
            grid: GridRecord::from_grid(&self.grid),
            organisms: self.organisms.iter().map(Organism::to_record).collect(),
            fossil_record: self.fossil.to_record(),
            next_organism: self.next_organism,
        }
    }

    /// Replace the world with a saved one.
    ///
    /// Organisms are placed in saved order onto the saved grid. An organism
    /// whose species is retained in the extinct map brings that species
    /// back; one with no species founds a new one. Afterwards every extant
    /// population must match its living members.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] describing the first inconsistency; the
    /// current world is left as it was.
    pub fn load(&mut self, record: &WorldRecord) -> Result<(), SnapshotError> {
        match self.rebuild(record) {
            Ok(()) => {
                info!(
                    tick = self.clock.tick(),
                    population = self.organisms.len(),
                    species = self.fossil.extant_count(),
                    "world loaded"
                );
                self.flush();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "world load rejected");
                Err(err)
            }
        }
    }

    /// Replace the world with one decoded from JSON.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load); malformed JSON yields
    /// [`SnapshotError::Json`].
    pub fn load_json(&mut self, json: &str) -> Result<(), SnapshotError> {
        let record = WorldRecord::from_json(json)?;
        self.load(&record)
    }

    fn rebuild(&mut self, record: &WorldRecord) -> Result<(), SnapshotError> {
        let mut grid = record.grid.to_grid()?;
        let mut fossil = FossilRecord::from_record(record.fossil_record.clone())?;
        let mut organisms: Vec<Organism> = Vec::with_capacity(record.organisms.len());
        let mut seen = BTreeSet::new();
        let mut revived = BTreeSet::new();
        let mut rng = self.rng.clone();
        let mut next_organism = record.next_organism;

        for saved in &record.organisms {
            let mut organism = Organism::from_record(saved)?;
            if !seen.insert(organism.id) {
                return Err(SnapshotError::DuplicateOrganism {
                    organism: organism.id,
                });
            }
            if !organism.place(&mut grid, &self.config.engine) {
                return Err(SnapshotError::Collision {
                    organism: organism.id,
                });
            }
            match organism.species {
                Some(species) if revived.contains(&species) => {
                    fossil.add_population(species);
                }
                Some(species) if fossil.is_extant(species) => {}
                Some(species) if fossil.resurrect(species) => {
                    info!(species = %species, "species resurrected by load");
                    revived.insert(species);
                    fossil.add_population(species);
                }
                Some(species) => {
                    return Err(SnapshotError::UnknownSpecies {
                        organism: organism.id,
                        species,
                    });
                }
                None => {
                    let species =
                        fossil.register_species(&organism.anatomy, None, record.tick, &mut rng);
                    organism.species = Some(species);
                }
            }
            if organism.id >= next_organism {
                next_organism = organism.id.next();
            }
            organisms.push(organism);
        }

        fossil.verify_populations(&census(&organisms))?;

        self.grid = grid;
        self.fossil = fossil;
        self.organisms = organisms;
        self.next_organism = next_organism;
        self.rng = rng;
        self.clock = WorldClock::from_parts(record.tick, self.clock.tick_interval_ms());
        self.reindex();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vivarium_organisms::GrowthPlan;
    use vivarium_types::{CellKind, Offset};

    use super::*;
    use crate::config::{ExtinctionPolicy, SimulationConfig};

    fn sim() -> WorldSimulation {
        let mut config = SimulationConfig::default();
        config.world.cols = 16;
        config.world.rows = 16;
        config.world.extinction_policy = ExtinctionPolicy::Continue;
        config.statistics.min_retained_population = 1;
        WorldSimulation::headless(config).unwrap()
    }

    #[test]
    fn save_and_load_reproduce_world() {
        let mut a = sim();
        a.reset(3);
        a.place_wall(0, 0);
        for _ in 0..5 {
            a.step().unwrap();
        }
        let json = a.save().to_json().unwrap();

        let mut b = sim();
        b.load_json(&json).unwrap();
        assert_eq!(b.tick(), a.tick());
        assert_eq!(b.organisms().len(), a.organisms().len());
        assert_eq!(b.grid().kind_at(Offset::ORIGIN), Some(CellKind::Wall));
        assert_eq!(b.species_census(), a.species_census());
        for (x, y) in a.organisms().iter().zip(b.organisms()) {
            assert_eq!(x.to_record(), y.to_record());
        }
    }

    #[test]
    fn colliding_organism_fails_without_side_effects() {
        let mut source = sim();
        source.inject_organism(&GrowthPlan::single(CellKind::Mouth), 4, 4).unwrap();
        let mut record = source.save();
        record.grid.walls.push([4, 4]);

        let mut target = sim();
        target.inject_organism(&GrowthPlan::single(CellKind::Producer), 9, 9).unwrap();
        let err = target.load(&record).unwrap_err();
        assert!(matches!(err, SnapshotError::Collision { .. }));
        assert_eq!(target.organisms().len(), 1);
        assert_eq!(target.grid().kind_at(Offset::new(9, 9)), Some(CellKind::Producer));
    }

    #[test]
    fn unknown_species_is_rejected() {
        let mut source = sim();
        source.inject_organism(&GrowthPlan::single(CellKind::Mouth), 4, 4).unwrap();
        let mut record = source.save();
        if let Some(org) = record.organisms.first_mut() {
            org.species = Some(SpeciesId(77));
        }
        assert!(matches!(
            sim().load(&record),
            Err(SnapshotError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn extinct_species_is_resurrected() {
        let mut source = sim();
        let id = source.inject_organism(&GrowthPlan::single(CellKind::Mouth), 4, 4).unwrap();
        let saved_organism = source.save().organisms;
        let species = source.organism(id).unwrap().species.unwrap();
        source.kill_all();
        source.clear_food();
        assert!(!source.fossil_record().is_extant(species));

        let mut record = source.save();
        record.organisms = saved_organism;
        let mut target = sim();
        target.load(&record).unwrap();
        assert!(target.fossil_record().is_extant(species));
        assert_eq!(target.fossil_record().species(species).unwrap().population, 1);
    }

    #[test]
    fn population_mismatch_is_rejected() {
        let mut source = sim();
        source.inject_organism(&GrowthPlan::single(CellKind::Mouth), 4, 4).unwrap();
        let mut record = source.save();
        if let Some(species) = record.fossil_record.extant.first_mut() {
            species.population = 5;
        }
        assert!(matches!(
            sim().load(&record),
            Err(SnapshotError::Ledger { .. })
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            sim().load_json("{\"tick\": 1"),
            Err(SnapshotError::Json { .. })
        ));
    }

    #[test]
    fn zero_stats_window_is_rejected() {
        let mut a = sim();
        a.reset(5);
        let json = a.save().to_json().unwrap();
        assert!(json.contains("\"window\":500"));
        let json = json.replace("\"window\":500", "\"window\":0");

        let mut b = sim();
        assert!(matches!(
            b.load_json(&json),
            Err(SnapshotError::Json { .. })
        ));
        assert_eq!(b.tick(), 0);
        assert!(b.organisms().is_empty());
    }
}
