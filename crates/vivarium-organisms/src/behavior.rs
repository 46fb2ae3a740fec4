//! Per-tick behavior of body cells.
//!
//! [`on_tick`] is the single dispatch point over the closed set of living
//! cell kinds. It runs once per body cell per tick, in anatomy order. Cells
//! act on the grid through [`CellContext`]; effects on *other* organisms
//! cannot be applied here (the caller owns them), so killer cells return
//! [`Strike`]s for the caller to apply before the next cell runs.
//!
//! | Kind | Action |
//! |------|--------|
//! | mouth | eat food on every edible neighbor |
//! | producer | maybe grow food on one growable neighbor |
//! | killer | strike other organisms on killable neighbors |
//! | eye | cast a ray and record what it hits |
//! | brain, mover, armor | nothing |
//!
//! Neighbor offsets are applied in world space; they do not rotate with
//! the body.

use rand::Rng;
use rand::seq::IndexedRandom;
use vivarium_types::{CellKind, Observation, OrganismId};
use vivarium_world::WorldGrid;

use crate::anatomy::BodyCell;
use crate::config::{EngineConfig, roll_percent};
use crate::organism::Organism;

/// Shared state a cell may touch while acting.
pub struct CellContext<'a, R: Rng + ?Sized> {
    /// The world grid.
    pub grid: &'a mut WorldGrid,
    /// The active configuration snapshot.
    pub config: &'a EngineConfig,
    /// The simulation's random stream.
    pub rng: &'a mut R,
}

/// A hit a killer cell lands on another organism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    /// The organism that was hit.
    pub victim: OrganismId,
    /// Whether the striker takes a hit back (the victim cell was a killer
    /// and `insta_kill` is on).
    pub retaliate: bool,
}

/// Run one body cell's action for this tick.
pub fn on_tick<R: Rng + ?Sized>(
    cell: &BodyCell,
    organism: &mut Organism,
    ctx: &mut CellContext<'_, R>,
) -> Vec<Strike> {
    match cell.kind {
        CellKind::Mouth => {
            eat(cell, organism, ctx);
            Vec::new()
        }
        CellKind::Producer => {
            produce(cell, organism, ctx);
            Vec::new()
        }
        CellKind::Killer => strike(cell, organism, ctx),
        CellKind::Eye => {
            look(cell, organism, ctx);
            Vec::new()
        }
        CellKind::Brain
        | CellKind::Mover
        | CellKind::Armor
        | CellKind::Empty
        | CellKind::Food
        | CellKind::Wall => Vec::new(),
    }
}

fn eat<R: Rng + ?Sized>(cell: &BodyCell, organism: &mut Organism, ctx: &mut CellContext<'_, R>) {
    let origin = organism.world_position(cell.offset);
    for offset in &ctx.config.edible_neighbors {
        let pos = origin.add(*offset);
        if ctx.grid.kind_at(pos) == Some(CellKind::Food) {
            ctx.grid.set_kind(pos, CellKind::Empty);
            organism.food_collected = organism.food_collected.saturating_add(1);
        }
    }
}

fn produce<R: Rng + ?Sized>(
    cell: &BodyCell,
    organism: &Organism,
    ctx: &mut CellContext<'_, R>,
) {
    if organism.anatomy.is_mover() && !ctx.config.movers_can_produce {
        return;
    }
    if !roll_percent(ctx.rng, ctx.config.food_production_probability) {
        return;
    }
    let Some(offset) = ctx.config.growable_neighbors.choose(ctx.rng).copied() else {
        return;
    };
    let pos = organism.world_position(cell.offset).add(offset);
    if ctx.grid.kind_at(pos) == Some(CellKind::Empty) {
        ctx.grid.set_kind(pos, CellKind::Food);
    }
}

fn strike<R: Rng + ?Sized>(
    cell: &BodyCell,
    organism: &Organism,
    ctx: &CellContext<'_, R>,
) -> Vec<Strike> {
    let origin = organism.world_position(cell.offset);
    ctx.config
        .killable_neighbors
        .iter()
        .filter_map(|offset| {
            let target = ctx.grid.get(origin.add(*offset))?;
            let owner = target.owner?;
            if owner.organism == organism.id || target.kind == CellKind::Armor {
                return None;
            }
            Some(Strike {
                victim: owner.organism,
                retaliate: ctx.config.insta_kill && target.kind == CellKind::Killer,
            })
        })
        .collect()
}

fn look<R: Rng + ?Sized>(cell: &BodyCell, organism: &mut Organism, ctx: &CellContext<'_, R>) {
    let Some(relative) = cell.look_direction() else {
        return;
    };
    let direction = relative.rotated_by(organism.orientation);
    let start = organism.world_position(cell.offset);
    let mut pos = start;
    for _ in 0..ctx.config.look_range {
        pos = pos.step(direction, 1);
        let Some(target) = ctx.grid.get(pos) else {
            return;
        };
        if ctx.config.see_through_self && target.is_owned_by(organism.id) {
            continue;
        }
        if target.kind != CellKind::Empty {
            organism.observations.push(Observation {
                target: target.kind,
                owner: target.owner.map(|o| o.organism),
                position: pos,
                distance: start.manhattan(pos),
                direction,
            });
            return;
        }
    }
}
