//! Observation payload recorded by eye cells.
//!
//! Each tick every eye cell may append one [`Observation`] to its owner's
//! observation buffer. The brain consumes the buffer in the decision step
//! of the same tick and then clears it.

use serde::{Deserialize, Serialize};

use crate::direction::{Direction, Offset};
use crate::enums::CellKind;
use crate::ids::OrganismId;

/// What an eye ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Kind of the first non-empty cell on the ray.
    pub target: CellKind,
    /// Owner of that cell, if it belongs to an organism.
    pub owner: Option<OrganismId>,
    /// Grid position of the cell (column, row).
    pub position: Offset,
    /// Manhattan step distance from the eye to the cell.
    pub distance: u32,
    /// Absolute direction the eye was looking.
    pub direction: Direction,
}
