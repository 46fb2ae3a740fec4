//! The renderer boundary.
//!
//! The simulation never draws anything itself. Every grid write that
//! changes a cell is queued by the [`WorldGrid`], and [`flush_changes`]
//! hands each changed cell to a [`RenderSink`] exactly once.

use crate::grid::{GridCell, WorldGrid};

/// Receives changed cells after each simulation step.
pub trait RenderSink: Send {
    /// Called once per changed cell, with the cell's current state.
    fn cell_changed(&mut self, cell: &GridCell);
}

/// A sink that discards every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn cell_changed(&mut self, _cell: &GridCell) {}
}

/// A sink that records changed cells in arrival order.
#[derive(Debug, Default, Clone)]
pub struct ChangeLog {
    cells: Vec<GridCell>,
}

impl ChangeLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells recorded so far.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Take every recorded cell, leaving the log empty.
    pub fn take(&mut self) -> Vec<GridCell> {
        std::mem::take(&mut self.cells)
    }
}

impl RenderSink for ChangeLog {
    fn cell_changed(&mut self, cell: &GridCell) {
        self.cells.push(*cell);
    }
}

/// Drain the grid's changed-cell queue into `sink`.
///
/// Returns the number of cells delivered.
pub fn flush_changes(grid: &mut WorldGrid, sink: &mut dyn RenderSink) -> usize {
    let changed = grid.drain_changes();
    let mut delivered = 0_usize;
    for pos in changed {
        if let Some(cell) = grid.get(pos) {
            sink.cell_changed(cell);
            delivered = delivered.saturating_add(1);
        }
    }
    if delivered > 0 {
        tracing::trace!(delivered, "flushed grid changes");
    }
    delivered
}
