//! Tick cycle: the loop that drives the Vivarium world.
//!
//! [`WorldSimulation`] owns every piece of mutable world state: the grid,
//! the organism list, the fossil record, the random stream and the clock.
//! Each call to [`WorldSimulation::step`] runs one tick:
//!
//! 1. **Sweep** -- every organism present at the start of the tick, in list
//!    order: age (dying of old age), reproduce when fed, run each body
//!    cell's action (stopping once dead), then the decision step. Effects
//!    are visible immediately to organisms later in the list. Children are
//!    appended and first act on the next tick.
//!
//! 2. **Cull** -- dead organisms are removed and their species populations
//!    decremented, fossilizing species that empty.
//!
//! 3. **Food drop** -- random food placed on empty cells.
//!
//! 4. **Extinction** -- if the world just emptied, apply the configured
//!    [`ExtinctionPolicy`].
//!
//! 5. **Record** -- statistics sampled every `sample_interval` ticks; grid
//!    changes flushed to the render sink.
//!
//! The cycle is deterministic given the same configuration and seed.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vivarium_ledger::{FossilRecord, StatsSample};
use vivarium_organisms::{
    Birth, CellContext, DeathCause, EngineConfig, GrowthPlan, Organism, Strike, on_tick,
    reproduce, roll_percent,
};
use vivarium_types::{CellKind, Offset, OrganismId, SpeciesId};
use vivarium_world::{NullSink, RenderSink, WorldError, WorldGrid, flush_changes};

use crate::clock::{ClockError, WorldClock};
use crate::config::{ConfigError, ExtinctionPolicy, SimulationConfig};

/// Divisor turning grid area times drop probability into drop attempts.
const FOOD_DROP_AREA_DIVISOR: f64 = 50_000.0;

/// Errors that can occur during tick execution or world construction.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The grid could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Living organisms at the end of the tick.
    pub population: u32,
    /// Children placed this tick.
    pub births: u32,
    /// Organisms removed this tick.
    pub deaths: u32,
    /// Extant species at the end of the tick.
    pub species_count: u32,
    /// Food cells dropped by the world this tick.
    pub food_dropped: u32,
    /// The population fell to zero this tick.
    pub extinct: bool,
    /// The world was reset by the extinction policy.
    pub reset: bool,
}

/// Point-in-time view of the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldStatus {
    /// Ticks since the last reset.
    pub tick: u64,
    /// Simulated milliseconds since the last reset.
    pub elapsed_ms: u64,
    /// Living organisms.
    pub population: u32,
    /// Extant species.
    pub species_count: u32,
    /// Resets performed, manual and automatic.
    pub reset_count: u64,
}

/// The running world.
pub struct WorldSimulation {
    pub(crate) config: SimulationConfig,
    pub(crate) grid: WorldGrid,
    pub(crate) organisms: Vec<Organism>,
    /// Organism id to position in `organisms`; valid between culls.
    pub(crate) index: BTreeMap<OrganismId, usize>,
    pub(crate) fossil: FossilRecord,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) clock: WorldClock,
    pub(crate) next_organism: OrganismId,
    pub(crate) reset_count: u64,
    sink: Box<dyn RenderSink>,
}

impl core::fmt::Debug for WorldSimulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorldSimulation")
            .field("tick", &self.clock.tick())
            .field("population", &self.organisms.len())
            .field("species", &self.fossil.extant_count())
            .field("reset_count", &self.reset_count)
            .finish_non_exhaustive()
    }
}

impl WorldSimulation {
    /// Build an empty world at tick 0 from a validated configuration.
    ///
    /// No organism is placed; call [`reset`](Self::reset) to seed the
    /// origin organism or [`inject_organism`](Self::inject_organism) to
    /// place specific ones.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Config`] if the configuration is out of domain
    /// or [`TickError::World`] if the grid cannot be allocated.
    pub fn new(config: SimulationConfig, sink: Box<dyn RenderSink>) -> Result<Self, TickError> {
        config.validate()?;
        let grid = WorldGrid::new(config.world.cols, config.world.rows)?;
        let fossil = FossilRecord::new(
            config.statistics.min_retained_population,
            config.statistics.record_window,
        );
        let rng = ChaCha8Rng::seed_from_u64(config.world.seed);
        let clock = WorldClock::new(config.world.tick_interval_ms);
        info!(
            cols = config.world.cols,
            rows = config.world.rows,
            seed = config.world.seed,
            "world created"
        );
        Ok(Self {
            config,
            grid,
            organisms: Vec::new(),
            index: BTreeMap::new(),
            fossil,
            rng,
            clock,
            next_organism: OrganismId(0),
            reset_count: 0,
            sink,
        })
    }

    /// Build an empty world that discards render notifications.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn headless(config: SimulationConfig) -> Result<Self, TickError> {
        Self::new(config, Box::new(NullSink))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Ticks since the last reset.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Simulated milliseconds since the last reset.
    pub const fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed_ms()
    }

    /// Living organisms in tick order.
    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    /// Look up a living organism.
    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.index
            .get(&id)
            .and_then(|&idx| self.organisms.get(idx))
    }

    /// The world grid.
    pub const fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    /// The species ledger and statistics series.
    pub const fn fossil_record(&self) -> &FossilRecord {
        &self.fossil
    }

    /// The active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Counters describing the current world.
    pub fn status(&self) -> WorldStatus {
        WorldStatus {
            tick: self.clock.tick(),
            elapsed_ms: self.clock.elapsed_ms(),
            population: self.population(),
            species_count: self.fossil.extant_count(),
            reset_count: self.reset_count,
        }
    }

    /// Living members per species, counted from the organism list.
    pub fn species_census(&self) -> BTreeMap<SpeciesId, u32> {
        census(&self.organisms)
    }

    fn population(&self) -> u32 {
        u32::try_from(self.organisms.len()).unwrap_or(u32::MAX)
    }

    // -----------------------------------------------------------------------
    // Control
    // -----------------------------------------------------------------------

    /// Replace the render sink. Pending changes go to the new sink.
    pub fn set_sink(&mut self, sink: Box<dyn RenderSink>) {
        self.sink = sink;
    }

    /// Swap in a new engine snapshot between ticks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the snapshot is out of domain;
    /// the previous snapshot stays active.
    pub fn apply_config(&mut self, engine: EngineConfig) -> Result<(), ConfigError> {
        if let Err(source) = engine.validate() {
            warn!(error = %source, "rejected engine configuration");
            return Err(ConfigError::Invalid { source });
        }
        self.config.engine = engine;
        info!(tick = self.clock.tick(), "engine configuration applied");
        Ok(())
    }

    /// Reseed the random stream and restart the world with the origin
    /// organism at the grid centre.
    pub fn reset(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.config.world.seed = seed;
        self.restart();
    }

    /// Restart without reseeding: clear organisms, food and species, zero
    /// the clock, and place the origin organism. Walls are kept.
    fn restart(&mut self) {
        self.organisms.clear();
        self.index.clear();
        self.grid
            .replace_where(|cell| cell.kind != CellKind::Wall, CellKind::Empty);
        self.fossil.clear();
        self.clock.reset();
        self.reset_count = self.reset_count.saturating_add(1);

        let center = self.grid.center();
        let seeded = self.inject_organism(&GrowthPlan::origin(), center.x, center.y);
        if seeded.is_none() {
            warn!(col = center.x, row = center.y, "origin organism blocked at grid centre");
        }
        self.record_sample();
        self.flush();
        info!(
            reset_count = self.reset_count,
            seed = self.config.world.seed,
            "world reset"
        );
    }

    /// Grow `plan` and place it with its anchor at (`col`, `row`).
    ///
    /// The organism founds a new species. Returns `None` when the footprint
    /// is blocked or out of bounds.
    pub fn inject_organism(&mut self, plan: &GrowthPlan, col: i32, row: i32) -> Option<OrganismId> {
        let id = self.next_organism;
        let mut organism = Organism::new(id, Offset::new(col, row), plan.grow());
        if !organism.place(&mut self.grid, &self.config.engine) {
            debug!(col, row, "injection blocked");
            return None;
        }
        self.next_organism = id.next();
        let species =
            self.fossil
                .register_species(&organism.anatomy, None, self.clock.tick(), &mut self.rng);
        organism.species = Some(species);
        debug!(organism = %id, species = %species, col, row, "organism injected");
        self.push_organism(organism);
        self.flush();
        Some(id)
    }

    /// Turn an empty or food cell into a wall.
    pub fn place_wall(&mut self, col: i32, row: i32) -> bool {
        let pos = Offset::new(col, row);
        let placed = matches!(
            self.grid.kind_at(pos),
            Some(CellKind::Empty | CellKind::Food | CellKind::Wall)
        ) && self.grid.set_kind(pos, CellKind::Wall);
        self.flush();
        placed
    }

    /// Remove every wall. Returns the number removed.
    pub fn clear_walls(&mut self) -> usize {
        let removed = self
            .grid
            .replace_where(|cell| cell.kind == CellKind::Wall, CellKind::Empty);
        self.flush();
        removed
    }

    /// Remove every food cell. Returns the number removed.
    pub fn clear_food(&mut self) -> usize {
        let removed = self
            .grid
            .replace_where(|cell| cell.kind == CellKind::Food, CellKind::Empty);
        self.flush();
        removed
    }

    /// Kill every living organism. Returns the number killed.
    ///
    /// Bodies become food and species populations are decremented as for
    /// natural deaths; the extinction policy is not applied.
    pub fn kill_all(&mut self) -> u32 {
        for organism in &mut self.organisms {
            organism.die(&mut self.grid, DeathCause::External);
        }
        let killed = self.cull();
        info!(killed, tick = self.clock.tick(), "all organisms killed");
        self.flush();
        killed
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if the tick counter would overflow.
    pub fn step(&mut self) -> Result<TickSummary, TickError> {
        let tick = self.clock.advance()?;
        let population_before = self.organisms.len();

        let mut births = 0_u32;
        for idx in 0..population_before {
            births = births.saturating_add(self.tick_organism(idx, tick));
        }

        let deaths = self.cull();
        let food_dropped = self.drop_food();

        let mut summary = TickSummary {
            tick,
            births,
            deaths,
            food_dropped,
            ..TickSummary::default()
        };

        if population_before > 0 && self.organisms.is_empty() {
            summary.extinct = true;
            match self.config.world.extinction_policy {
                ExtinctionPolicy::Continue => info!(tick, "population extinct"),
                ExtinctionPolicy::Pause => info!(tick, "population extinct, pausing"),
                ExtinctionPolicy::Reset => {
                    info!(tick, "population extinct, resetting");
                    self.restart();
                    summary.reset = true;
                }
            }
        }

        if !summary.reset
            && tick
                .checked_rem(self.config.statistics.sample_interval)
                .is_some_and(|r| r == 0)
        {
            self.record_sample();
        }

        summary.population = self.population();
        summary.species_count = self.fossil.extant_count();
        self.flush();
        Ok(summary)
    }

    /// Run one organism's turn. Returns the number of children placed.
    fn tick_organism(&mut self, idx: usize, tick: u64) -> u32 {
        let engine = &self.config.engine;
        let Some(organism) = self.organisms.get_mut(idx) else {
            return 0;
        };
        if !organism.is_alive() || !organism.age_one_tick(&mut self.grid, engine) {
            return 0;
        }

        let mut births = 0;
        if organism.ready_to_reproduce(engine) {
            let child_id = self.next_organism;
            if let Some(birth) = reproduce(organism, child_id, &mut self.grid, engine, &mut self.rng)
            {
                self.next_organism = child_id.next();
                self.admit(birth, tick);
                births = 1;
            }
        }

        let cell_count = self
            .organisms
            .get(idx)
            .map_or(0, |org| org.anatomy.cells().len());
        for cell_idx in 0..cell_count {
            let strikes = {
                let Some(organism) = self.organisms.get_mut(idx) else {
                    return births;
                };
                let Some(cell) = organism.anatomy.cells().get(cell_idx).copied() else {
                    break;
                };
                if !organism.is_alive() {
                    break;
                }
                let mut ctx = CellContext {
                    grid: &mut self.grid,
                    config: &self.config.engine,
                    rng: &mut self.rng,
                };
                on_tick(&cell, organism, &mut ctx)
            };
            for strike in strikes {
                self.apply_strike(idx, strike);
            }
        }

        if let Some(organism) = self.organisms.get_mut(idx)
            && organism.is_alive()
        {
            organism.decide();
        }
        births
    }

    /// Land a killer hit on its victim, and on the striker when the hit is
    /// retaliated. Hits on organisms already dead are dropped.
    fn apply_strike(&mut self, striker: usize, strike: Strike) {
        let engine = &self.config.engine;
        let Some(victim) = self
            .index
            .get(&strike.victim)
            .and_then(|&idx| self.organisms.get_mut(idx))
        else {
            return;
        };
        if !victim.is_alive() {
            return;
        }
        victim.harm(&mut self.grid, engine);
        if strike.retaliate
            && let Some(organism) = self.organisms.get_mut(striker)
        {
            organism.harm(&mut self.grid, engine);
        }
    }

    /// Register a newborn with its species and append it to the list.
    fn admit(&mut self, birth: Birth, tick: u64) {
        let Birth { mut child, mutated } = birth;
        let inherited = child.species;
        let joined = !mutated && inherited.is_some_and(|id| self.fossil.add_population(id));
        let species = match inherited {
            Some(id) if joined => id,
            _ => {
                let ancestor = inherited.filter(|id| self.fossil.is_extant(*id));
                self.fossil
                    .register_species(&child.anatomy, ancestor, tick, &mut self.rng)
            }
        };
        child.species = Some(species);
        debug!(
            organism = %child.id,
            species = %species,
            mutated,
            cells = child.anatomy.cell_count(),
            "organism born"
        );
        self.push_organism(child);
    }

    fn push_organism(&mut self, organism: Organism) {
        self.index.insert(organism.id, self.organisms.len());
        self.organisms.push(organism);
    }

    /// Remove dead organisms, decrementing their species. Returns the
    /// number removed.
    fn cull(&mut self) -> u32 {
        let tick = self.clock.tick();
        let fossil = &mut self.fossil;
        let mut removed = 0_u32;
        self.organisms.retain(|organism| {
            if !organism.is_dead() {
                return true;
            }
            if let Some(species) = organism.species {
                fossil.decrease_population(species, tick);
            }
            removed = removed.saturating_add(1);
            false
        });
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    pub(crate) fn reindex(&mut self) {
        self.index = self
            .organisms
            .iter()
            .enumerate()
            .map(|(idx, organism)| (organism.id, idx))
            .collect();
    }

    /// Drop food on random empty cells. Returns the number placed.
    fn drop_food(&mut self) -> u32 {
        let probability = self.config.engine.food_drop_probability;
        if probability <= 0.0 {
            return 0;
        }
        let attempts = food_drop_attempts(self.grid.cols(), self.grid.rows(), probability);
        let mut dropped = 0_u32;
        for _ in 0..attempts {
            if !roll_percent(&mut self.rng, probability) {
                continue;
            }
            let col = self.rng.random_range(0..self.grid.cols());
            let row = self.rng.random_range(0..self.grid.rows());
            let (Ok(col), Ok(row)) = (i32::try_from(col), i32::try_from(row)) else {
                continue;
            };
            let pos = Offset::new(col, row);
            if self.grid.kind_at(pos) == Some(CellKind::Empty) {
                self.grid.set_kind(pos, CellKind::Food);
                dropped = dropped.saturating_add(1);
            }
        }
        dropped
    }

    pub(crate) fn record_sample(&mut self) {
        let sample = StatsSample::collect(
            self.clock.tick(),
            self.organisms.iter(),
            self.fossil.extant_count(),
        );
        self.fossil.record_sample(sample);
    }

    pub(crate) fn flush(&mut self) {
        flush_changes(&mut self.grid, self.sink.as_mut());
    }
}

/// Count living members per species.
pub(crate) fn census(organisms: &[Organism]) -> BTreeMap<SpeciesId, u32> {
    let mut live = BTreeMap::new();
    for species in organisms.iter().filter_map(|org| org.species) {
        let count: &mut u32 = live.entry(species).or_default();
        *count = count.saturating_add(1);
    }
    live
}

/// Number of food drop attempts per tick: `max(cols * rows * p / 50000, 1)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn food_drop_attempts(cols: u32, rows: u32, probability: f64) -> u32 {
    let raw = (f64::from(cols) * f64::from(rows) * probability / FOOD_DROP_AREA_DIVISOR).floor();
    // Clamped into u32 range before the cast.
    raw.clamp(1.0, f64::from(u32::MAX)) as u32
}
