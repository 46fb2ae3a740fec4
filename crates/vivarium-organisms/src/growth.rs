//! Growth plans: scripted construction of an anatomy.
//!
//! A [`GrowthPlan`] names the anchor kind and an ordered list of steps. A
//! cursor starts on the anchor; each step moves the cursor one cell along
//! its direction and then places its kind there if the offset is free. A
//! step without a kind only moves the cursor.

use serde::{Deserialize, Serialize};
use vivarium_types::{CellKind, Direction, Offset};

use crate::anatomy::Anatomy;

/// One step of a growth plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthStep {
    /// Kind to place after moving, or `None` to only move.
    pub kind: Option<CellKind>,
    /// Direction the cursor moves before placing.
    pub direction: Direction,
}

impl GrowthStep {
    /// Move, then place `kind`.
    pub const fn place(kind: CellKind, direction: Direction) -> Self {
        Self {
            kind: Some(kind),
            direction,
        }
    }

    /// Move without placing.
    pub const fn skip(direction: Direction) -> Self {
        Self {
            kind: None,
            direction,
        }
    }
}

/// A scripted anatomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthPlan {
    /// Kind placed at the anchor.
    pub anchor: CellKind,
    /// Steps executed in order after the anchor.
    pub steps: Vec<GrowthStep>,
}

impl GrowthPlan {
    /// The default seed organism: a mouth anchor flanked by two producers
    /// on its south-east and north-west diagonals.
    pub fn origin() -> Self {
        Self {
            anchor: CellKind::Mouth,
            steps: vec![
                GrowthStep::place(CellKind::Producer, Direction::SouthEast),
                GrowthStep::skip(Direction::NorthWest),
                GrowthStep::place(CellKind::Producer, Direction::NorthWest),
            ],
        }
    }

    /// A single-cell plan.
    pub const fn single(kind: CellKind) -> Self {
        Self {
            anchor: kind,
            steps: Vec::new(),
        }
    }

    /// Build a fresh anatomy from this plan.
    pub fn grow(&self) -> Anatomy {
        let mut anatomy = Anatomy::new();
        anatomy.execute_growth_plan(self);
        anatomy
    }
}

impl Anatomy {
    /// Replace this anatomy's cells with the ones `plan` builds.
    ///
    /// Returns the number of cells placed. Eyes are placed in their default
    /// state. A plan whose anchor is not a living kind places nothing.
    pub fn execute_growth_plan(&mut self, plan: &GrowthPlan) -> usize {
        self.clear();
        if self.add_default_cell(plan.anchor, Offset::ORIGIN).is_none() {
            return 0;
        }
        let mut placed = 1_usize;
        let mut cursor = Offset::ORIGIN;
        for step in &plan.steps {
            cursor = cursor.step(step.direction, 1);
            if let Some(kind) = step.kind
                && self.add_default_cell(kind, cursor).is_some()
            {
                placed = placed.saturating_add(1);
            }
        }
        placed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn origin_plan_builds_the_seed_organism() {
        let anatomy = GrowthPlan::origin().grow();
        assert_eq!(anatomy.cell_count(), 3);
        assert_eq!(anatomy.cell_at(Offset::ORIGIN).unwrap().kind, CellKind::Mouth);
        assert_eq!(anatomy.cell_at(Offset::new(1, 1)).unwrap().kind, CellKind::Producer);
        assert_eq!(anatomy.cell_at(Offset::new(-1, -1)).unwrap().kind, CellKind::Producer);
        assert_eq!(anatomy.birth_distance(), 3);
    }

    #[test]
    fn skip_steps_consume_a_slot() {
        let plan = GrowthPlan {
            anchor: CellKind::Mouth,
            steps: vec![
                GrowthStep::skip(Direction::East),
                GrowthStep::place(CellKind::Eye, Direction::East),
            ],
        };
        let anatomy = plan.grow();
        assert!(anatomy.cell_at(Offset::new(1, 0)).is_none());
        let eye = anatomy.cell_at(Offset::new(2, 0)).unwrap();
        assert_eq!(eye.look_direction(), Some(Direction::North));
    }

    #[test]
    fn occupied_steps_are_skipped() {
        let plan = GrowthPlan {
            anchor: CellKind::Mouth,
            steps: vec![
                GrowthStep::place(CellKind::Armor, Direction::North),
                GrowthStep::place(CellKind::Killer, Direction::South),
            ],
        };
        let mut anatomy = Anatomy::new();
        assert_eq!(anatomy.execute_growth_plan(&plan), 2);
        assert_eq!(anatomy.cell_at(Offset::ORIGIN).unwrap().kind, CellKind::Mouth);
        assert_eq!(anatomy.count(CellKind::Killer), 0);
    }

    #[test]
    fn terrain_anchor_places_nothing() {
        let mut anatomy = Anatomy::new();
        assert_eq!(anatomy.execute_growth_plan(&GrowthPlan::single(CellKind::Food)), 0);
        assert_eq!(anatomy.cell_count(), 0);
    }
}
