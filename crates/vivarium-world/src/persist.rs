//! Sparse persistence of a grid.
//!
//! A saved grid records only its dimensions and the positions of food and
//! wall cells. Organism cells are not part of the record; organisms are
//! re-placed separately when a world is loaded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use vivarium_types::{CellKind, Offset};

use crate::error::PersistError;
use crate::grid::WorldGrid;

/// Serialized form of a grid: `{cols, rows, food: [[c, r]..], walls: [[c, r]..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridRecord {
    /// Column count.
    pub cols: u32,
    /// Row count.
    pub rows: u32,
    /// Positions of food cells as `[col, row]`.
    #[serde(default)]
    pub food: Vec<[i32; 2]>,
    /// Positions of wall cells as `[col, row]`.
    #[serde(default)]
    pub walls: Vec<[i32; 2]>,
}

impl GridRecord {
    /// Capture the food and wall cells of `grid`.
    pub fn from_grid(grid: &WorldGrid) -> Self {
        let encode = |kind| {
            grid.positions_of(kind)
                .into_iter()
                .map(|pos| [pos.x, pos.y])
                .collect()
        };
        Self {
            cols: grid.cols(),
            rows: grid.rows(),
            food: encode(CellKind::Food),
            walls: encode(CellKind::Wall),
        }
    }

    /// Build a fresh grid holding exactly the recorded food and walls.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Dimensions`] for unusable dimensions,
    /// [`PersistError::OutOfBounds`] for a coordinate outside the grid, and
    /// [`PersistError::Conflicting`] when a position is both food and wall.
    pub fn to_grid(&self) -> Result<WorldGrid, PersistError> {
        let mut grid = WorldGrid::new(self.cols, self.rows)?;

        let mut walls = HashSet::with_capacity(self.walls.len());
        for &[col, row] in &self.walls {
            let pos = self.checked("wall", &grid, col, row)?;
            walls.insert(pos);
            grid.set_kind(pos, CellKind::Wall);
        }
        for &[col, row] in &self.food {
            let pos = self.checked("food", &grid, col, row)?;
            if walls.contains(&pos) {
                return Err(PersistError::Conflicting { col, row });
            }
            grid.set_kind(pos, CellKind::Food);
        }

        tracing::debug!(
            cols = self.cols,
            rows = self.rows,
            food = self.food.len(),
            walls = self.walls.len(),
            "grid loaded"
        );
        Ok(grid)
    }

    fn checked(
        &self,
        kind: &'static str,
        grid: &WorldGrid,
        col: i32,
        row: i32,
    ) -> Result<Offset, PersistError> {
        let pos = Offset::new(col, row);
        if grid.contains(pos) {
            Ok(pos)
        } else {
            Err(PersistError::OutOfBounds {
                kind,
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            })
        }
    }

    /// Encode as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Json`] if the payload is malformed.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }
}
