//! Notifications published by the [`SimulationEngine`].
//!
//! Payloads are plain values or immutable [`Grid`] snapshots; observers can
//! never reach the engine's own grid through them.
//!
//! [`SimulationEngine`]: crate::engine::SimulationEngine

use std::sync::Arc;

use crate::grid::{Cell, Grid};

/// A new grid replaced the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCreated {
    /// Columns of the new grid.
    pub cells_x: usize,
    /// Rows of the new grid.
    pub cells_y: usize,
}

/// One cell changed state, by toggle or by generation advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChanged {
    /// Row of the changed cell.
    pub row: usize,
    /// Column of the changed cell.
    pub col: usize,
    /// The cell's new state.
    pub cell: Cell,
}

/// A generation left the grid without any alive cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameEnded {
    /// Generation number of the empty grid.
    pub generation: u64,
}

/// A generation finished and has been installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationAdvanced {
    /// Generation number after the advance (the first advance yields 1).
    pub generation: u64,
    /// Alive cells in the new grid.
    pub population: usize,
    /// Cells whose state flipped during the advance.
    pub changed: usize,
    /// Read-only view of the new grid.
    pub snapshot: Arc<Grid>,
}
