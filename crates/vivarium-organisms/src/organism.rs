//! Organism state and lifecycle.
//!
//! An [`Organism`] owns its [`Anatomy`] and the per-individual state that
//! evolves each tick: age, damage, collected food, mutability and heading.
//! Its cells appear on the grid at `anchor + rotate(offset)` where the
//! rotation bucket comes from the body orientation.
//!
//! Lifecycle: [`Lifecycle::Growing`] until placed on the grid without
//! collision, then [`Lifecycle::Alive`], then [`Lifecycle::Dead`] (terminal).

use serde::{Deserialize, Serialize};
use tracing::debug;
use vivarium_types::{
    CellKind, Direction, Environment, Observation, Offset, OrganismId, SpeciesId,
};
use vivarium_world::{CellOwner, WorldGrid};

use crate::anatomy::{Anatomy, AnatomyRecord};
use crate::brain::BrainPolicy;
use crate::config::EngineConfig;
use crate::death::{DeathCause, check_death};
use crate::error::OrganismError;

/// Mutation chance (percent) of a freshly created organism.
pub const DEFAULT_MUTABILITY: u32 = 5;

/// Movement range of a freshly created organism.
pub const DEFAULT_MOVE_RANGE: u32 = 4;

/// Where an organism is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    /// Built but not yet on the grid.
    #[default]
    Growing,
    /// On the grid and ticking.
    Alive,
    /// Removed from play; never revives.
    Dead,
}

/// One organism.
#[derive(Debug, Clone, PartialEq)]
pub struct Organism {
    /// Identifier, unique within one world.
    pub id: OrganismId,
    /// Whether the world or an editor owns this organism.
    pub environment: Environment,
    /// Grid position of the anchor cell.
    pub anchor: Offset,
    /// Body orientation; drives anatomy rotation.
    pub orientation: Direction,
    /// Movement and look heading, independent of the body orientation.
    pub heading: Direction,
    /// The body plan.
    pub anatomy: Anatomy,
    /// Ticks lived.
    pub age: u64,
    /// Hits taken. Never decreases.
    pub damage: u32,
    /// Food eaten since the last reproduction.
    pub food_collected: u32,
    /// Percent chance that offspring mutate.
    pub mutability: u32,
    /// Movement range, carried through inheritance.
    pub move_range: u32,
    /// Species this organism belongs to, if registered.
    pub species: Option<SpeciesId>,
    /// Decision policy, present once the organism has ever had eyes.
    pub brain: Option<BrainPolicy>,
    /// Lifecycle state.
    pub lifecycle: Lifecycle,
    /// Observations recorded by eye cells this tick.
    pub observations: Vec<Observation>,
    /// Set once the organism dies.
    pub death_cause: Option<DeathCause>,
}

impl Organism {
    /// Create a growing world organism with default traits.
    pub fn new(id: OrganismId, anchor: Offset, anatomy: Anatomy) -> Self {
        let brain = anatomy.has_eyes().then(BrainPolicy::default);
        Self {
            id,
            environment: Environment::World,
            anchor,
            orientation: Direction::North,
            heading: Direction::North,
            anatomy,
            age: 0,
            damage: 0,
            food_collected: 0,
            mutability: DEFAULT_MUTABILITY,
            move_range: DEFAULT_MOVE_RANGE,
            species: None,
            brain,
            lifecycle: Lifecycle::Growing,
            observations: Vec::new(),
            death_cause: None,
        }
    }

    /// Whether the organism is on the grid and ticking.
    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    /// Whether the organism has died.
    pub fn is_dead(&self) -> bool {
        self.lifecycle == Lifecycle::Dead
    }

    /// Grid position of the body cell at `offset` for the current pose.
    pub fn world_position(&self, offset: Offset) -> Offset {
        Self::position_for(self.anchor, self.orientation, offset)
    }

    fn position_for(anchor: Offset, orientation: Direction, offset: Offset) -> Offset {
        anchor.add(orientation.facing().rotate(offset))
    }

    /// Grid positions of every body cell, in anatomy order.
    pub fn cell_positions(&self) -> Vec<Offset> {
        self.anatomy
            .cells()
            .iter()
            .map(|cell| self.world_position(cell.offset))
            .collect()
    }

    /// Ticks this organism may live: `cell_count * lifespan_multiplier`.
    pub fn lifespan(&self, config: &EngineConfig) -> u64 {
        u64::from(self.anatomy.cell_count()).saturating_mul(u64::from(config.lifespan_multiplier))
    }

    /// Food required to reproduce.
    pub fn food_needed(&self, config: &EngineConfig) -> u32 {
        let base = self.anatomy.cell_count();
        if self.anatomy.is_mover() {
            base.saturating_add(config.extra_mover_food_cost)
        } else {
            base
        }
    }

    /// Whether enough food has been collected to attempt reproduction.
    pub fn ready_to_reproduce(&self, config: &EngineConfig) -> bool {
        self.food_collected >= self.food_needed(config)
    }

    /// Whether this anatomy fits on the grid at `anchor` facing `orientation`.
    ///
    /// Every covered cell must be in bounds and either empty, already owned
    /// by this organism, or food when food does not block reproduction.
    pub fn footprint_clear(
        &self,
        grid: &WorldGrid,
        anchor: Offset,
        orientation: Direction,
        config: &EngineConfig,
    ) -> bool {
        self.anatomy.cells().iter().all(|cell| {
            let pos = Self::position_for(anchor, orientation, cell.offset);
            grid.get(pos).is_some_and(|target| {
                target.kind == CellKind::Empty
                    || target.is_owned_by(self.id)
                    || (target.kind == CellKind::Food && !config.food_blocks_reproduction)
            })
        })
    }

    /// Whether every cell strictly between `from` and `to` on a straight
    /// row or column is passable for this organism.
    ///
    /// Passable cells are empty, food, or owned by this organism or by
    /// `parent`. Positions that do not share a row or column are never
    /// clear.
    pub fn straight_path_clear(
        &self,
        grid: &WorldGrid,
        from: Offset,
        to: Offset,
        parent: OrganismId,
    ) -> bool {
        let step = if from.x == to.x {
            Offset::new(0, (to.y.saturating_sub(from.y)).signum())
        } else if from.y == to.y {
            Offset::new((to.x.saturating_sub(from.x)).signum(), 0)
        } else {
            return false;
        };
        let mut pos = from.add(step);
        while pos != to && !step.is_origin() {
            let passable = grid.get(pos).is_some_and(|cell| {
                matches!(cell.kind, CellKind::Empty | CellKind::Food)
                    || cell.is_owned_by(self.id)
                    || cell.is_owned_by(parent)
            });
            if !passable {
                return false;
            }
            pos = pos.add(step);
        }
        true
    }

    /// Put a growing organism on the grid at its anchor.
    ///
    /// Returns `false` and leaves the organism growing if the footprint is
    /// not clear.
    pub fn place(&mut self, grid: &mut WorldGrid, config: &EngineConfig) -> bool {
        if self.lifecycle != Lifecycle::Growing
            || self.anatomy.cell_count() == 0
            || !self.footprint_clear(grid, self.anchor, self.orientation, config)
        {
            return false;
        }
        for cell in self.anatomy.cells() {
            let owner = CellOwner {
                organism: self.id,
                offset: cell.offset,
            };
            grid.set(self.world_position(cell.offset), cell.kind, Some(owner));
        }
        self.lifecycle = Lifecycle::Alive;
        true
    }

    /// Advance age by one tick, dying of old age past the lifespan.
    ///
    /// Returns whether the organism is still alive.
    pub fn age_one_tick(&mut self, grid: &mut WorldGrid, config: &EngineConfig) -> bool {
        self.age = self.age.saturating_add(1);
        if check_death(self, config) == Some(DeathCause::OldAge) {
            self.die(grid, DeathCause::OldAge);
        }
        self.is_alive()
    }

    /// Take one hit. Returns whether this hit killed the organism.
    ///
    /// Hits on an organism that is not alive are ignored.
    pub fn harm(&mut self, grid: &mut WorldGrid, config: &EngineConfig) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.damage = self.damage.saturating_add(1);
        if check_death(self, config) == Some(DeathCause::Injury) {
            self.die(grid, DeathCause::Injury);
            return true;
        }
        false
    }

    /// Kill the organism, turning every grid cell it owns into food.
    pub fn die(&mut self, grid: &mut WorldGrid, cause: DeathCause) {
        if self.is_dead() {
            return;
        }
        let was_placed = self.is_alive();
        self.lifecycle = Lifecycle::Dead;
        self.death_cause = Some(cause);
        if was_placed {
            for pos in self.cell_positions() {
                if grid.get(pos).is_some_and(|cell| cell.is_owned_by(self.id)) {
                    grid.set_kind(pos, CellKind::Food);
                }
            }
        }
        debug!(
            organism = %self.id,
            cause = %cause,
            age = self.age,
            cells = self.anatomy.cell_count(),
            "organism died"
        );
    }

    /// Run the decision step and clear the observation buffer.
    pub fn decide(&mut self) {
        if let Some(brain) = &self.brain
            && let Some(heading) = brain.decide(&self.observations, self.id)
        {
            self.heading = heading;
        }
        self.observations.clear();
    }

    /// Serializable form of this organism.
    pub fn to_record(&self) -> OrganismRecord {
        OrganismRecord {
            id: self.id,
            anchor: self.anchor,
            orientation: self.orientation,
            heading: self.heading,
            anatomy: self.anatomy.to_record(),
            age: self.age,
            damage: self.damage,
            food_collected: self.food_collected,
            mutability: self.mutability,
            move_range: self.move_range,
            species: self.species,
            brain: self.brain.clone(),
        }
    }

    /// Rebuild a growing organism from its record.
    ///
    /// # Errors
    ///
    /// Returns an [`OrganismError`] if the recorded anatomy is invalid.
    pub fn from_record(record: &OrganismRecord) -> Result<Self, OrganismError> {
        let anatomy = Anatomy::from_record(&record.anatomy)?;
        Ok(Self {
            id: record.id,
            environment: Environment::World,
            anchor: record.anchor,
            orientation: record.orientation,
            heading: record.heading,
            anatomy,
            age: record.age,
            damage: record.damage,
            food_collected: record.food_collected,
            mutability: record.mutability.max(1),
            move_range: record.move_range.max(1),
            species: record.species,
            brain: record.brain.clone(),
            lifecycle: Lifecycle::Growing,
            observations: Vec::new(),
            death_cause: None,
        })
    }
}

/// Serialized organism, as stored in a world save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganismRecord {
    /// Organism identifier.
    pub id: OrganismId,
    /// Anchor position.
    pub anchor: Offset,
    /// Body orientation.
    #[serde(default)]
    pub orientation: Direction,
    /// Heading.
    #[serde(default)]
    pub heading: Direction,
    /// Body plan.
    pub anatomy: AnatomyRecord,
    /// Ticks lived.
    #[serde(default)]
    pub age: u64,
    /// Hits taken.
    #[serde(default)]
    pub damage: u32,
    /// Food collected.
    #[serde(default)]
    pub food_collected: u32,
    /// Mutation chance.
    #[serde(default = "default_mutability")]
    pub mutability: u32,
    /// Movement range.
    #[serde(default = "default_move_range")]
    pub move_range: u32,
    /// Species key.
    #[serde(default)]
    pub species: Option<SpeciesId>,
    /// Decision policy.
    #[serde(default)]
    pub brain: Option<BrainPolicy>,
}

const fn default_mutability() -> u32 {
    DEFAULT_MUTABILITY
}

const fn default_move_range() -> u32 {
    DEFAULT_MOVE_RANGE
}
