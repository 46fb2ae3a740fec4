//! Reproduction and mutation.
//!
//! A parent with enough food produces one child per attempt:
//! 1. The child deep-copies the parent's anatomy, brain, movement range,
//!    mutability and species key, and picks a random body orientation when
//!    rotation is enabled.
//! 2. The child's mutability drifts by one (unless a global mutability is
//!    configured), then a mutation roll decides whether it changes.
//! 3. The child is placed on a random cardinal line from the parent at
//!    `birth_distance` plus up to two cells, if its footprint and the path
//!    to it are clear.
//!
//! The parent pays `food_needed` whether or not placement succeeds.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;
use vivarium_types::{CellKind, Direction, Offset, OrganismId};
use vivarium_world::WorldGrid;

use crate::anatomy::AddMode;
use crate::brain::BrainPolicy;
use crate::config::{EngineConfig, roll_percent};
use crate::organism::{Lifecycle, Organism};

/// Percent chance that a mutating mover changes behavior instead of body.
const BEHAVIORAL_MUTATION_PERCENT: f64 = 10.0;

/// Largest extra distance (in cells) added to the birth distance.
const MAX_BIRTH_JITTER: u32 = 2;

/// A child successfully placed on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Birth {
    /// The newly placed child, already alive.
    pub child: Organism,
    /// Whether the child's body differs from its parent's.
    pub mutated: bool,
}

/// Attempt one reproduction.
///
/// Returns the placed child, or `None` when no clear spot was found. The
/// parent's food is reduced by `food_needed` (floored at zero) in both
/// cases.
pub fn reproduce<R: Rng + ?Sized>(
    parent: &mut Organism,
    child_id: OrganismId,
    grid: &mut WorldGrid,
    config: &EngineConfig,
    rng: &mut R,
) -> Option<Birth> {
    let birth = conceive(parent, child_id, grid, config, rng);
    let cost = parent.food_needed(config);
    parent.food_collected = parent.food_collected.saturating_sub(cost);
    birth
}

fn conceive<R: Rng + ?Sized>(
    parent: &Organism,
    child_id: OrganismId,
    grid: &mut WorldGrid,
    config: &EngineConfig,
    rng: &mut R,
) -> Option<Birth> {
    let mut child = offspring(parent, child_id, config, rng);

    let mut mutated = false;
    if roll_percent(rng, f64::from(effective_mutability(&child, config))) {
        if child.anatomy.is_mover() && roll_percent(rng, BEHAVIORAL_MUTATION_PERCENT) {
            mutate_behavior(&mut child, rng);
        } else {
            mutated = mutate_body(&mut child, config, rng);
        }
    }

    let direction = Direction::CARDINAL.choose(rng).copied()?;
    let jitter = rng.random_range(0..=MAX_BIRTH_JITTER);
    let distance = parent.anatomy.birth_distance().saturating_add(jitter);
    let anchor = birth_anchor(parent.anchor, direction, distance)?;

    if !child.footprint_clear(grid, anchor, child.orientation, config)
        || !child.straight_path_clear(grid, parent.anchor, anchor, parent.id)
    {
        return None;
    }
    child.anchor = anchor;
    if !child.place(grid, config) {
        return None;
    }
    debug!(
        parent = %parent.id,
        child = %child.id,
        col = anchor.x,
        row = anchor.y,
        mutated,
        "organism born"
    );
    Some(Birth { child, mutated })
}

/// Build the unplaced child: a copy of the parent's heritable state.
fn offspring<R: Rng + ?Sized>(
    parent: &Organism,
    child_id: OrganismId,
    config: &EngineConfig,
    rng: &mut R,
) -> Organism {
    let mut child = Organism::new(child_id, parent.anchor, parent.anatomy.clone());
    child.environment = parent.environment;
    child.brain.clone_from(&parent.brain);
    child.move_range = parent.move_range;
    child.mutability = parent.mutability;
    child.species = parent.species;
    child.heading = parent.heading;
    child.lifecycle = Lifecycle::Growing;
    if config.rotation_enabled {
        child.orientation = Direction::ALL.choose(rng).copied().unwrap_or_default();
    }
    if !config.use_global_mutability {
        child.mutability = if rng.random_bool(0.5) {
            child.mutability.saturating_add(1)
        } else {
            child.mutability.saturating_sub(1).max(1)
        };
    }
    child
}

/// Mutation chance for a child: the global value when enabled, otherwise
/// the child's own drifted mutability.
fn effective_mutability(child: &Organism, config: &EngineConfig) -> u32 {
    if config.use_global_mutability {
        config.global_mutability
    } else {
        child.mutability
    }
}

/// Mutate decision policy and movement range instead of the body.
fn mutate_behavior<R: Rng + ?Sized>(organism: &mut Organism, rng: &mut R) {
    if organism.anatomy.has_eyes() {
        organism.brain.get_or_insert_with(BrainPolicy::default).mutate(rng);
    }
    organism.move_range = if rng.random_bool(0.5) {
        organism.move_range.saturating_add(1)
    } else {
        organism.move_range.saturating_sub(1).max(1)
    };
}

/// Apply the three independent body mutation events: add, change, remove.
///
/// Returns whether the anatomy changed.
pub fn mutate_body<R: Rng + ?Sized>(
    organism: &mut Organism,
    config: &EngineConfig,
    rng: &mut R,
) -> bool {
    let mut changed = false;

    if roll_percent(rng, config.add_probability)
        && let Some(branch) = organism.anatomy.cells().choose(rng).copied()
    {
        let kind = random_living_kind(rng);
        let direction = Direction::ALL.choose(rng).copied().unwrap_or_default();
        let offset = branch.offset.step(direction, 1);
        if organism.anatomy.can_place_at(offset) {
            let had_eyes = organism.anatomy.has_eyes();
            if organism
                .anatomy
                .add_cell(kind, offset, AddMode::Randomized, rng)
                .is_some()
            {
                changed = true;
                wire_first_eye(organism, had_eyes, config, rng);
            }
        }
    }

    if roll_percent(rng, config.change_probability)
        && let Some(target) = organism.anatomy.cells().choose(rng).copied()
    {
        let kind = random_living_kind(rng);
        let had_eyes = organism.anatomy.has_eyes();
        if organism
            .anatomy
            .replace_cell(target.offset, kind, AddMode::Randomized, rng)
            .is_some()
        {
            changed = true;
            wire_first_eye(organism, had_eyes, config, rng);
        }
    }

    if roll_percent(rng, config.remove_probability)
        && organism.anatomy.cell_count() > 1
        && let Some(target) = organism.anatomy.cells().choose(rng).copied()
        && organism.anatomy.remove_cell(target.offset, false)
    {
        changed = true;
    }

    changed
}

/// An organism that just gained its first eye gets a freshly randomized
/// brain.
fn wire_first_eye<R: Rng + ?Sized>(
    organism: &mut Organism,
    had_eyes: bool,
    config: &EngineConfig,
    rng: &mut R,
) {
    if had_eyes || !organism.anatomy.has_eyes() {
        return;
    }
    organism
        .brain
        .get_or_insert_with(BrainPolicy::default)
        .randomize_decisions(config.randomize_all_decisions, rng);
}

fn random_living_kind<R: Rng + ?Sized>(rng: &mut R) -> CellKind {
    CellKind::LIVING.choose(rng).copied().unwrap_or(CellKind::Mouth)
}

/// Where a child would be anchored for a given direction and distance.
pub fn birth_anchor(parent_anchor: Offset, direction: Direction, distance: u32) -> Option<Offset> {
    i32::try_from(distance)
        .ok()
        .map(|steps| parent_anchor.step(direction, steps))
}
