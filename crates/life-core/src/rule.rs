//! The B3/S23 transition rule.
//!
//! A live cell survives with exactly 2 or 3 live neighbors; a dead cell is
//! born with exactly 3. Neighbors are the up to 8 orthogonally and
//! diagonally adjacent cells, and cells outside the grid count as dead.
//!
//! [`next_generation`] reads only from its input grid and writes into a new
//! one, so every cell of generation `t + 1` is computed from the complete
//! generation `t`.

use crate::grid::{Cell, Grid};

/// Offsets of the eight neighbors as `(row, col)` deltas.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// State of a cell in the next generation given its live-neighbor count.
pub const fn next_state(cell: Cell, live_neighbors: u8) -> Cell {
    match (cell, live_neighbors) {
        (Cell::Alive, 2 | 3) | (Cell::Dead, 3) => Cell::Alive,
        _ => Cell::Dead,
    }
}

/// Number of alive cells adjacent to `(row, col)`.
pub fn live_neighbors(grid: &Grid, row: usize, col: usize) -> u8 {
    let mut count: u8 = 0;
    for (d_row, d_col) in NEIGHBOR_OFFSETS {
        let alive = row
            .checked_add_signed(d_row)
            .zip(col.checked_add_signed(d_col))
            .and_then(|(r, c)| grid.get(r, c))
            .is_some_and(Cell::is_alive);
        if alive {
            count = count.saturating_add(1);
        }
    }
    count
}

/// Compute the next generation of `grid`.
///
/// Pure and deterministic: the same input always yields the same output.
#[must_use]
pub fn next_generation(grid: &Grid) -> Grid {
    grid.map(|row, col, cell| next_state(cell, live_neighbors(grid, row, col)))
}
