//! Organism body plans.
//!
//! An [`Anatomy`] is the ordered list of [`BodyCell`]s that make up one
//! organism, expressed in body-local offsets around the anchor `(0, 0)`.
//! Alongside the cells it keeps derived aggregates: per-kind counts and the
//! birth distance used when placing offspring. The aggregates are rebuilt
//! by [`Anatomy::recompute_aggregates`] once per structural edit, so they
//! always agree with the cells when an edit returns.
//!
//! Edits that would break an invariant (occupied offset, non-living kind,
//! removing the anchor) are refused and reported as `None` or `false`.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use vivarium_types::{CellKind, Direction, Offset};

use crate::error::OrganismError;

/// One cell of an organism's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyCell {
    /// The cell's kind. Always a living kind.
    pub kind: CellKind,
    /// Body-local offset from the anchor.
    pub offset: Offset,
    /// Look direction relative to the body; present exactly on eye cells.
    pub look: Option<Direction>,
}

impl BodyCell {
    /// The eye's body-relative look direction, or `None` for other kinds.
    pub const fn look_direction(&self) -> Option<Direction> {
        self.look
    }
}

/// How kind-specific state is initialised when a cell is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMode {
    /// Default state (eyes look north).
    Default,
    /// Random state (eyes look in a random direction).
    Randomized,
    /// State copied from an existing cell when kinds match, else default.
    Inherited(BodyCell),
}

/// The body plan of one organism.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Anatomy {
    cells: Vec<BodyCell>,
    counts: [u32; 10],
    birth_distance: u32,
}

impl Anatomy {
    /// Create an anatomy with no cells.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cells in insertion order.
    pub fn cells(&self) -> &[BodyCell] {
        &self.cells
    }

    /// The cell at `offset`, if any.
    pub fn cell_at(&self, offset: Offset) -> Option<&BodyCell> {
        self.cells.iter().find(|cell| cell.offset == offset)
    }

    /// Number of cells.
    pub fn cell_count(&self) -> u32 {
        u32::try_from(self.cells.len()).unwrap_or(u32::MAX)
    }

    /// Number of cells of `kind`.
    pub fn count(&self, kind: CellKind) -> u32 {
        self.counts.get(kind.index()).copied().unwrap_or(0)
    }

    /// Whether the anatomy contains at least one cell of `kind`.
    pub fn has(&self, kind: CellKind) -> bool {
        self.count(kind) > 0
    }

    /// Whether the anatomy has a mover cell.
    pub fn is_mover(&self) -> bool {
        self.has(CellKind::Mover)
    }

    /// Whether the anatomy has an eye cell.
    pub fn has_eyes(&self) -> bool {
        self.has(CellKind::Eye)
    }

    /// Distance at which offspring are placed: `2 * max(|x|, |y|) + 1`.
    pub const fn birth_distance(&self) -> u32 {
        self.birth_distance
    }

    /// Whether `offset` is free for a new cell.
    pub fn can_place_at(&self, offset: Offset) -> bool {
        self.cell_at(offset).is_none()
    }

    /// Add a cell of a living `kind` at `offset`.
    ///
    /// Returns the new cell, or `None` when the offset is occupied or the
    /// kind cannot be part of a body.
    pub fn add_cell<R: Rng + ?Sized>(
        &mut self,
        kind: CellKind,
        offset: Offset,
        mode: AddMode,
        rng: &mut R,
    ) -> Option<BodyCell> {
        let cell = self.insert(kind, offset, mode, rng)?;
        self.recompute_aggregates();
        Some(cell)
    }

    /// Add a cell in its default state. Eyes look north.
    pub fn add_default_cell(&mut self, kind: CellKind, offset: Offset) -> Option<BodyCell> {
        let cell = self.push_cell(kind, offset, Direction::North)?;
        self.recompute_aggregates();
        Some(cell)
    }

    /// Replace whatever is at `offset` with a new cell of `kind`.
    ///
    /// The anchor may be replaced. Aggregates are recomputed once, after the
    /// new cell is in place.
    pub fn replace_cell<R: Rng + ?Sized>(
        &mut self,
        offset: Offset,
        kind: CellKind,
        mode: AddMode,
        rng: &mut R,
    ) -> Option<BodyCell> {
        if !kind.is_living() {
            return None;
        }
        self.take(offset, true);
        let cell = self.insert(kind, offset, mode, rng);
        self.recompute_aggregates();
        cell
    }

    /// Remove the cell at `offset`.
    ///
    /// The anchor is only removed when `allow_center_removal` is set.
    /// Returns whether a cell was removed.
    pub fn remove_cell(&mut self, offset: Offset, allow_center_removal: bool) -> bool {
        let removed = self.take(offset, allow_center_removal);
        if removed {
            self.recompute_aggregates();
        }
        removed
    }

    fn insert<R: Rng + ?Sized>(
        &mut self,
        kind: CellKind,
        offset: Offset,
        mode: AddMode,
        rng: &mut R,
    ) -> Option<BodyCell> {
        let look = match mode {
            AddMode::Default => Direction::North,
            AddMode::Randomized => Direction::ALL.choose(rng).copied().unwrap_or_default(),
            AddMode::Inherited(source) => source.look.unwrap_or_default(),
        };
        self.push_cell(kind, offset, look)
    }

    fn push_cell(&mut self, kind: CellKind, offset: Offset, look: Direction) -> Option<BodyCell> {
        if !kind.is_living() || !self.can_place_at(offset) {
            return None;
        }
        let look = (kind == CellKind::Eye).then_some(look);
        let cell = BodyCell { kind, offset, look };
        self.cells.push(cell);
        Some(cell)
    }

    fn take(&mut self, offset: Offset, allow_center_removal: bool) -> bool {
        if offset.is_origin() && !allow_center_removal {
            return false;
        }
        let Some(pos) = self.cells.iter().position(|cell| cell.offset == offset) else {
            return false;
        };
        self.cells.remove(pos);
        true
    }

    /// Rebuild per-kind counts and the birth distance from the cells.
    pub fn recompute_aggregates(&mut self) {
        let mut counts = [0_u32; 10];
        let mut reach = 0_u32;
        for cell in &self.cells {
            if let Some(slot) = counts.get_mut(cell.kind.index()) {
                *slot = slot.saturating_add(1);
            }
            reach = reach.max(cell.offset.chebyshev());
        }
        self.counts = counts;
        self.birth_distance = reach.saturating_mul(2).saturating_add(1);
    }

    /// Offsets of existing cells in the 8-neighborhood of `offset`.
    pub fn neighbors_of(&self, offset: Offset) -> Vec<Offset> {
        Direction::ALL
            .iter()
            .map(|dir| offset.step(*dir, 1))
            .filter(|neighbor| !self.can_place_at(*neighbor))
            .collect()
    }

    /// Remove every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.recompute_aggregates();
    }

    /// Serializable form of this anatomy.
    pub fn to_record(&self) -> AnatomyRecord {
        AnatomyRecord {
            cells: self
                .cells
                .iter()
                .map(|cell| CellRecord {
                    x: cell.offset.x,
                    y: cell.offset.y,
                    kind: cell.kind,
                    direction: cell.look,
                })
                .collect(),
        }
    }

    /// Rebuild an anatomy from its record, recomputing the aggregates.
    ///
    /// # Errors
    ///
    /// Returns an [`OrganismError`] if the record is empty, lacks an anchor,
    /// repeats an offset, or names a non-living kind.
    pub fn from_record(record: &AnatomyRecord) -> Result<Self, OrganismError> {
        if record.cells.is_empty() {
            return Err(OrganismError::EmptyAnatomy);
        }
        let mut anatomy = Self::new();
        for entry in &record.cells {
            let offset = Offset::new(entry.x, entry.y);
            if !entry.kind.is_living() {
                return Err(OrganismError::NonLivingCell {
                    kind: entry.kind,
                    offset,
                });
            }
            if !anatomy.can_place_at(offset) {
                return Err(OrganismError::DuplicateCell { offset });
            }
            let look = (entry.kind == CellKind::Eye).then(|| entry.direction.unwrap_or_default());
            anatomy.cells.push(BodyCell {
                kind: entry.kind,
                offset,
                look,
            });
        }
        if anatomy.can_place_at(Offset::ORIGIN) {
            return Err(OrganismError::MissingAnchor);
        }
        anatomy.recompute_aggregates();
        Ok(anatomy)
    }
}

/// Serialized anatomy: `{cells: [{x, y, kind, direction?}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnatomyRecord {
    /// Cells in anatomy order.
    pub cells: Vec<CellRecord>,
}

/// One serialized body cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Body-local column offset.
    pub x: i32,
    /// Body-local row offset.
    pub y: i32,
    /// Cell kind name.
    pub kind: CellKind,
    /// Eye look direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn assert_aggregates_consistent(anatomy: &Anatomy) {
        for kind in CellKind::ALL {
            let actual = anatomy.cells().iter().filter(|c| c.kind == kind).count();
            assert_eq!(anatomy.count(kind) as usize, actual, "count for {kind}");
            assert_eq!(anatomy.has(kind), actual > 0);
        }
        let reach = anatomy
            .cells()
            .iter()
            .map(|c| c.offset.chebyshev())
            .max()
            .unwrap_or(0);
        assert_eq!(anatomy.birth_distance(), 2 * reach + 1);
    }

    #[test]
    fn add_cell_rejects_occupied_offsets() {
        let mut rng = rng();
        let mut anatomy = Anatomy::new();
        let at = Offset::new(1, 0);
        assert!(anatomy.can_place_at(at));
        assert!(anatomy.add_cell(CellKind::Mouth, at, AddMode::Default, &mut rng).is_some());
        assert!(!anatomy.can_place_at(at));
        assert!(anatomy.add_cell(CellKind::Armor, at, AddMode::Default, &mut rng).is_none());
        assert_eq!(anatomy.cell_count(), 1);
    }

    #[test]
    fn add_cell_rejects_terrain_kinds() {
        let mut anatomy = Anatomy::new();
        for kind in [CellKind::Empty, CellKind::Food, CellKind::Wall] {
            assert!(
                anatomy
                    .add_cell(kind, Offset::ORIGIN, AddMode::Default, &mut rng())
                    .is_none()
            );
        }
    }

    #[test]
    fn aggregates_track_every_edit() {
        let mut rng = rng();
        let mut anatomy = Anatomy::new();
        anatomy.add_cell(CellKind::Mouth, Offset::ORIGIN, AddMode::Default, &mut rng);
        anatomy.add_cell(CellKind::Armor, Offset::new(2, -1), AddMode::Default, &mut rng);
        anatomy.add_cell(CellKind::Eye, Offset::new(-1, 0), AddMode::Randomized, &mut rng);
        assert_aggregates_consistent(&anatomy);
        assert!(anatomy.has(CellKind::Armor));
        assert!(anatomy.has_eyes());
        assert_eq!(anatomy.birth_distance(), 5);

        anatomy.replace_cell(Offset::new(-1, 0), CellKind::Mover, AddMode::Default, &mut rng);
        assert_aggregates_consistent(&anatomy);
        assert!(!anatomy.has_eyes());
        assert!(anatomy.is_mover());

        assert!(anatomy.remove_cell(Offset::new(2, -1), false));
        assert_aggregates_consistent(&anatomy);
        assert_eq!(anatomy.birth_distance(), 3);
    }

    #[test]
    fn armor_does_not_count_as_eye() {
        let mut anatomy = Anatomy::new();
        anatomy.add_cell(CellKind::Armor, Offset::ORIGIN, AddMode::Default, &mut rng());
        assert!(anatomy.has(CellKind::Armor));
        assert!(!anatomy.has_eyes());
    }

    #[test]
    fn anchor_removal_requires_permission() {
        let mut rng = rng();
        let mut anatomy = Anatomy::new();
        anatomy.add_cell(CellKind::Mouth, Offset::ORIGIN, AddMode::Default, &mut rng);
        assert!(!anatomy.remove_cell(Offset::ORIGIN, false));
        assert_eq!(anatomy.cell_count(), 1);
        assert!(anatomy.remove_cell(Offset::ORIGIN, true));
        assert_eq!(anatomy.cell_count(), 0);
        assert!(!anatomy.remove_cell(Offset::new(5, 5), true));
    }

    #[test]
    fn replace_cell_keeps_the_offset_occupied() {
        let mut rng = rng();
        let mut anatomy = Anatomy::new();
        anatomy.add_cell(CellKind::Mouth, Offset::ORIGIN, AddMode::Default, &mut rng);
        let cell = anatomy
            .replace_cell(Offset::ORIGIN, CellKind::Killer, AddMode::Default, &mut rng)
            .unwrap();
        assert_eq!(cell.kind, CellKind::Killer);
        assert_eq!(anatomy.cell_count(), 1);
        assert_eq!(anatomy.count(CellKind::Mouth), 0);
        assert_eq!(anatomy.count(CellKind::Killer), 1);
    }

    #[test]
    fn eye_state_follows_add_mode() {
        let mut rng = rng();
        let mut anatomy = Anatomy::new();
        let eye = anatomy
            .add_cell(CellKind::Eye, Offset::ORIGIN, AddMode::Default, &mut rng)
            .unwrap();
        assert_eq!(eye.look_direction(), Some(Direction::North));

        let source = BodyCell {
            kind: CellKind::Eye,
            offset: Offset::new(3, 3),
            look: Some(Direction::SouthWest),
        };
        let copy = anatomy
            .add_cell(CellKind::Eye, Offset::new(1, 0), AddMode::Inherited(source), &mut rng)
            .unwrap();
        assert_eq!(copy.look_direction(), Some(Direction::SouthWest));

        let mouth = anatomy
            .add_cell(CellKind::Mouth, Offset::new(2, 0), AddMode::Randomized, &mut rng)
            .unwrap();
        assert_eq!(mouth.look_direction(), None);
    }

    #[test]
    fn neighbors_exclude_self_and_missing_cells() {
        let mut rng = rng();
        let mut anatomy = Anatomy::new();
        for offset in [
            Offset::ORIGIN,
            Offset::new(1, 1),
            Offset::new(-1, 0),
            Offset::new(3, 0),
        ] {
            anatomy.add_cell(CellKind::Producer, offset, AddMode::Default, &mut rng);
        }
        let mut neighbors = anatomy.neighbors_of(Offset::ORIGIN);
        neighbors.sort();
        assert_eq!(neighbors, vec![Offset::new(-1, 0), Offset::new(1, 1)]);
    }

    #[test]
    fn record_roundtrip_recomputes_aggregates() {
        let mut rng = rng();
        let mut anatomy = Anatomy::new();
        anatomy.add_cell(CellKind::Mouth, Offset::ORIGIN, AddMode::Default, &mut rng);
        anatomy.add_cell(CellKind::Eye, Offset::new(0, -2), AddMode::Randomized, &mut rng);

        let json = serde_json::to_string(&anatomy.to_record()).unwrap();
        let record: AnatomyRecord = serde_json::from_str(&json).unwrap();
        let loaded = Anatomy::from_record(&record).unwrap();
        assert_eq!(loaded, anatomy);
    }

    #[test]
    fn record_accepts_stinger_alias() {
        let json = r#"{"cells":[{"x":0,"y":0,"kind":"stinger"}]}"#;
        let record: AnatomyRecord = serde_json::from_str(json).unwrap();
        let anatomy = Anatomy::from_record(&record).unwrap();
        assert_eq!(anatomy.count(CellKind::Killer), 1);
    }

    #[test]
    fn invalid_records_are_rejected() {
        let empty = AnatomyRecord::default();
        assert!(matches!(Anatomy::from_record(&empty), Err(OrganismError::EmptyAnatomy)));

        let no_anchor: AnatomyRecord =
            serde_json::from_str(r#"{"cells":[{"x":1,"y":0,"kind":"mouth"}]}"#).unwrap();
        assert!(matches!(Anatomy::from_record(&no_anchor), Err(OrganismError::MissingAnchor)));

        let duplicate: AnatomyRecord = serde_json::from_str(
            r#"{"cells":[{"x":0,"y":0,"kind":"mouth"},{"x":0,"y":0,"kind":"eye"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            Anatomy::from_record(&duplicate),
            Err(OrganismError::DuplicateCell { .. })
        ));

        let terrain: AnatomyRecord =
            serde_json::from_str(r#"{"cells":[{"x":0,"y":0,"kind":"food"}]}"#).unwrap();
        assert!(matches!(
            Anatomy::from_record(&terrain),
            Err(OrganismError::NonLivingCell { .. })
        ));
    }
}
