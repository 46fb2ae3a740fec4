//! The world grid: a dense 2-D array of cells with ownership tracking.
//!
//! The [`WorldGrid`] is the spatial backbone of the simulation. Each
//! [`GridCell`] holds a kind and, when the cell is part of a living body,
//! a [`CellOwner`] naming the organism and the body-local offset of the
//! body cell that occupies it.
//!
//! Every write that changes a cell's kind or ownership is recorded in a
//! deduplicated changed-cell queue. The simulation drains the queue into
//! the external [`RenderSink`](crate::RenderSink) after each step.
//!
//! # Invariant
//!
//! Every cell whose kind is a living kind carries an owner, and every cell
//! with an owner holds a living kind. Callers maintain the second half of
//! the invariant (that the owner is alive) by rewriting all of an
//! organism's cells when it dies.

use serde::{Deserialize, Serialize};
use vivarium_types::{CellKind, Offset, OrganismId};

use crate::error::WorldError;

/// Largest number of cells a grid may hold (4096 x 4096).
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Back-reference from a grid cell to the body cell occupying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOwner {
    /// The owning organism.
    pub organism: OrganismId,
    /// Body-local (unrotated) offset of the occupying body cell.
    pub offset: Offset,
}

/// One cell of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// What is in this cell.
    pub kind: CellKind,
    /// The organism body cell occupying this cell, if any.
    pub owner: Option<CellOwner>,
    /// Column of this cell.
    pub col: i32,
    /// Row of this cell.
    pub row: i32,
}

impl GridCell {
    /// Grid position of this cell.
    pub const fn position(&self) -> Offset {
        Offset::new(self.col, self.row)
    }

    /// Whether this cell belongs to the given organism.
    pub fn is_owned_by(&self, organism: OrganismId) -> bool {
        self.owner.is_some_and(|owner| owner.organism == organism)
    }
}

/// A bounded grid of cells with a changed-cell queue.
#[derive(Debug, Clone)]
pub struct WorldGrid {
    /// Number of columns.
    cols: u32,
    /// Number of rows.
    rows: u32,
    /// Row-major cell storage.
    cells: Vec<GridCell>,
    /// Positions changed since the last drain, in first-change order.
    changed: Vec<Offset>,
    /// Per-cell flag mirroring membership in `changed`.
    dirty: Vec<bool>,
}

impl WorldGrid {
    /// Create a grid of empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ZeroSize`] if either dimension is zero, or
    /// [`WorldError::TooLarge`] if the cell count exceeds
    /// [`MAX_GRID_CELLS`] or a coordinate overflows.
    pub fn new(cols: u32, rows: u32) -> Result<Self, WorldError> {
        if cols == 0 || rows == 0 {
            return Err(WorldError::ZeroSize { cols, rows });
        }
        let too_large = || WorldError::TooLarge { cols, rows };
        if u64::from(cols).saturating_mul(u64::from(rows)) > MAX_GRID_CELLS {
            return Err(too_large());
        }
        let max_col = i32::try_from(cols).map_err(|_err| too_large())?;
        let max_row = i32::try_from(rows).map_err(|_err| too_large())?;
        let len = usize::try_from(u64::from(cols).saturating_mul(u64::from(rows)))
            .map_err(|_err| too_large())?;

        let mut cells = Vec::with_capacity(len);
        for row in 0..max_row {
            for col in 0..max_col {
                cells.push(GridCell {
                    kind: CellKind::Empty,
                    owner: None,
                    col,
                    row,
                });
            }
        }

        Ok(Self {
            cols,
            rows,
            cells,
            changed: Vec::new(),
            dirty: vec![false; len],
        })
    }

    /// Number of columns.
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of rows.
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// The cell nearest the middle of the grid.
    pub fn center(&self) -> Offset {
        let col = i32::try_from(self.cols / 2).unwrap_or(0);
        let row = i32::try_from(self.rows / 2).unwrap_or(0);
        Offset::new(col, row)
    }

    /// Whether `pos` lies inside the grid.
    pub fn contains(&self, pos: Offset) -> bool {
        self.index(pos).is_some()
    }

    /// Row-major index of `pos`, or `None` when out of bounds.
    fn index(&self, pos: Offset) -> Option<usize> {
        let col = u32::try_from(pos.x).ok()?;
        let row = u32::try_from(pos.y).ok()?;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let idx = u64::from(row)
            .checked_mul(u64::from(self.cols))?
            .checked_add(u64::from(col))?;
        usize::try_from(idx).ok()
    }

    /// The cell at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Offset) -> Option<&GridCell> {
        self.index(pos).and_then(|idx| self.cells.get(idx))
    }

    /// The kind at `pos`, or `None` when out of bounds.
    pub fn kind_at(&self, pos: Offset) -> Option<CellKind> {
        self.get(pos).map(|cell| cell.kind)
    }

    /// The owner of the cell at `pos`, if it is in bounds and owned.
    pub fn owner_at(&self, pos: Offset) -> Option<CellOwner> {
        self.get(pos).and_then(|cell| cell.owner)
    }

    /// Write a cell's kind and owner.
    ///
    /// Returns `false` (and writes nothing) when `pos` is out of bounds.
    /// Writes that change the kind or the owner are queued for the
    /// renderer; identical writes are not.
    pub fn set(&mut self, pos: Offset, kind: CellKind, owner: Option<CellOwner>) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        let Some(cell) = self.cells.get_mut(idx) else {
            return false;
        };
        if cell.kind == kind && cell.owner == owner {
            return true;
        }
        cell.kind = kind;
        cell.owner = owner;
        self.mark_changed(idx, pos);
        true
    }

    /// Write a terrain kind (empty, food, wall) with no owner.
    pub fn set_kind(&mut self, pos: Offset, kind: CellKind) -> bool {
        self.set(pos, kind, None)
    }

    fn mark_changed(&mut self, idx: usize, pos: Offset) {
        if let Some(flag) = self.dirty.get_mut(idx)
            && !*flag
        {
            *flag = true;
            self.changed.push(pos);
        }
    }

    /// Take every position changed since the last drain.
    pub fn drain_changes(&mut self) -> Vec<Offset> {
        self.dirty.fill(false);
        std::mem::take(&mut self.changed)
    }

    /// Number of changes waiting to be drained.
    pub fn pending_changes(&self) -> usize {
        self.changed.len()
    }

    /// Reset every cell to empty with no owner.
    pub fn clear(&mut self) {
        self.replace_where(|_cell| true, CellKind::Empty);
    }

    /// Rewrite every cell matching `predicate` to an ownerless `kind`.
    /// Returns the number of cells rewritten.
    pub fn replace_where<F>(&mut self, mut predicate: F, kind: CellKind) -> usize
    where
        F: FnMut(&GridCell) -> bool,
    {
        let targets: Vec<Offset> = self
            .cells
            .iter()
            .filter(|cell| predicate(cell))
            .map(GridCell::position)
            .collect();
        let mut count = 0_usize;
        for pos in targets {
            let before = self.get(pos).copied();
            if self.set(pos, kind, None) && before.is_some_and(|b| b.kind != kind || b.owner.is_some()) {
                count = count.saturating_add(1);
            }
        }
        count
    }

    /// Iterate over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Positions of every cell of `kind`, in row-major order.
    pub fn positions_of(&self, kind: CellKind) -> Vec<Offset> {
        self.cells
            .iter()
            .filter(|cell| cell.kind == kind)
            .map(GridCell::position)
            .collect()
    }

    /// Number of cells of `kind`.
    pub fn count_of(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|cell| cell.kind == kind).count()
    }

    /// Every owned cell belonging to `organism`.
    pub fn cells_owned_by(&self, organism: OrganismId) -> Vec<&GridCell> {
        self.cells
            .iter()
            .filter(|cell| cell.is_owned_by(organism))
            .collect()
    }
}
