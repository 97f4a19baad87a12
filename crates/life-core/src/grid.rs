//! Dense rectangular cell grid.
//!
//! A [`Grid`] is `cells_x` columns by `cells_y` rows, stored row-major in a
//! single vector so every row always has exactly `cells_x` cells. Cells are
//! addressed as `(row, col)`. Anything outside the grid reads as dead; there
//! is no wraparound.
//!
//! All access is bounds-checked: lookups return `Option`, mutations return
//! [`GridError::OutOfBounds`] and leave the grid untouched.

use std::fmt;

use crate::seed::CellSeeder;

/// Errors produced by grid construction and cell access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Width or height is zero.
    #[error("invalid grid dimensions {cells_x}x{cells_y}: both must be positive")]
    InvalidDimensions {
        /// Requested number of columns.
        cells_x: usize,
        /// Requested number of rows.
        cells_y: usize,
    },

    /// `cells_x * cells_y` does not fit in memory addressing.
    #[error("grid dimensions {cells_x}x{cells_y} are too large")]
    TooLarge {
        /// Requested number of columns.
        cells_x: usize,
        /// Requested number of rows.
        cells_y: usize,
    },

    /// A coordinate lies outside the grid.
    #[error("cell ({row}, {col}) is outside the {cells_x}x{cells_y} grid")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid width.
        cells_x: usize,
        /// Grid height.
        cells_y: usize,
    },

    /// A text pattern could not be parsed.
    #[error("invalid pattern at line {line}: {reason}")]
    Pattern {
        /// 1-based line number within the pattern text.
        line: usize,
        /// Explanation of what is wrong.
        reason: String,
    },
}

/// State of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Dead,
    /// Populated cell.
    Alive,
}

impl Cell {
    /// Map a boolean to a cell state.
    pub const fn from_alive(alive: bool) -> Self {
        if alive { Self::Alive } else { Self::Dead }
    }

    /// Whether the cell is alive.
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// The opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Alive => Self::Dead,
            Self::Dead => Self::Alive,
        }
    }

    /// Character used by [`Grid`]'s text rendering.
    pub const fn symbol(self) -> char {
        match self {
            Self::Alive => '#',
            Self::Dead => '.',
        }
    }
}

/// Rectangular matrix of cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Number of columns.
    cells_x: usize,
    /// Number of rows.
    cells_y: usize,
    /// Row-major cell storage, `cells_x * cells_y` long.
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-dead grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero
    /// and [`GridError::TooLarge`] if the cell count overflows.
    pub fn new(cells_x: usize, cells_y: usize) -> Result<Self, GridError> {
        Self::from_fn(cells_x, cells_y, |_, _| Cell::Dead)
    }

    /// Create a grid whose cells are decided one by one by `seeder`.
    ///
    /// Cells are visited row by row, left to right.
    ///
    /// # Errors
    ///
    /// Same as [`Grid::new`].
    pub fn seeded(
        cells_x: usize,
        cells_y: usize,
        seeder: &mut dyn CellSeeder,
    ) -> Result<Self, GridError> {
        Self::from_fn(cells_x, cells_y, |row, col| {
            Cell::from_alive(seeder.is_alive(row, col))
        })
    }

    /// Create a grid by calling `f(row, col)` for every cell.
    ///
    /// # Errors
    ///
    /// Same as [`Grid::new`].
    pub fn from_fn<F>(cells_x: usize, cells_y: usize, mut f: F) -> Result<Self, GridError>
    where
        F: FnMut(usize, usize) -> Cell,
    {
        if cells_x == 0 || cells_y == 0 {
            return Err(GridError::InvalidDimensions { cells_x, cells_y });
        }
        let len = cells_x
            .checked_mul(cells_y)
            .ok_or(GridError::TooLarge { cells_x, cells_y })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_err| GridError::TooLarge { cells_x, cells_y })?;
        for row in 0..cells_y {
            for col in 0..cells_x {
                cells.push(f(row, col));
            }
        }

        Ok(Self {
            cells_x,
            cells_y,
            cells,
        })
    }

    /// Parse a text pattern.
    ///
    /// Each non-blank line is one row. `#` and `O` are alive, `.` is dead.
    /// Surrounding whitespace on a line is ignored, and every row must have
    /// the same width.
    ///
    /// ```
    /// use life_core::grid::{Cell, Grid};
    ///
    /// let grid = Grid::from_pattern("
    ///     .#.
    ///     .#.
    ///     .#.
    /// ").unwrap();
    /// assert_eq!(grid.dimensions(), (3, 3));
    /// assert_eq!(grid.get(1, 1), Some(Cell::Alive));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Pattern`] for unknown characters, ragged rows or
    /// an empty pattern.
    pub fn from_pattern(text: &str) -> Result<Self, GridError> {
        let mut rows: Vec<Vec<Cell>> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index.saturating_add(1);
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            let row = trimmed
                .chars()
                .map(|symbol| match symbol {
                    '#' | 'O' => Ok(Cell::Alive),
                    '.' => Ok(Cell::Dead),
                    other => Err(GridError::Pattern {
                        line,
                        reason: format!("unexpected character {other:?}"),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;

            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(GridError::Pattern {
                        line,
                        reason: format!("row has {} cells, expected {}", row.len(), first.len()),
                    });
                }
            }
            rows.push(row);
        }

        let cells_y = rows.len();
        let cells_x = rows.first().map_or(0, Vec::len);
        if cells_y == 0 {
            return Err(GridError::Pattern {
                line: 1,
                reason: "pattern has no rows".to_owned(),
            });
        }

        Ok(Self {
            cells_x,
            cells_y,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of columns.
    pub const fn cells_x(&self) -> usize {
        self.cells_x
    }

    /// Number of rows.
    pub const fn cells_y(&self) -> usize {
        self.cells_y
    }

    /// `(cells_x, cells_y)`.
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.cells_x, self.cells_y)
    }

    /// Whether `(row, col)` lies inside the grid.
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.cells_y && col < self.cells_x
    }

    /// Storage index of `(row, col)`, or `None` when out of bounds.
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if !self.contains(row, col) {
            return None;
        }
        row.checked_mul(self.cells_x)?.checked_add(col)
    }

    const fn out_of_bounds(&self, row: usize, col: usize) -> GridError {
        GridError::OutOfBounds {
            row,
            col,
            cells_x: self.cells_x,
            cells_y: self.cells_y,
        }
    }

    /// Cell at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col)
            .and_then(|index| self.cells.get(index))
            .copied()
    }

    /// Overwrite the cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] outside the grid.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), GridError> {
        let error = self.out_of_bounds(row, col);
        let slot = self
            .index(row, col)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(error)?;
        *slot = cell;
        Ok(())
    }

    /// Flip the cell at `(row, col)` and return its new state.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] outside the grid.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<Cell, GridError> {
        let error = self.out_of_bounds(row, col);
        let slot = self
            .index(row, col)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(error)?;
        *slot = slot.toggled();
        Ok(*slot)
    }

    /// Number of alive cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.cells_x)
    }

    /// Iterate over every cell as `(row, col, cell)`, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.rows().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (row, col, *cell))
        })
    }

    /// Coordinates of every alive cell, row by row.
    pub fn alive_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.iter()
            .filter(|(_, _, cell)| cell.is_alive())
            .map(|(row, col, _)| (row, col))
    }

    /// Build a grid of the same shape, computing each cell with `f`.
    #[must_use]
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, usize, Cell) -> Cell,
    {
        Self {
            cells_x: self.cells_x,
            cells_y: self.cells_y,
            cells: self.iter().map(|(row, col, cell)| f(row, col, cell)).collect(),
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::seed::DeadSeeder;

    #[test]
    fn new_grid_has_requested_shape() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.dimensions(), (4, 3));
        assert_eq!(grid.rows().count(), 3);
        assert!(grid.rows().all(|row| row.len() == 4));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            Grid::new(0, 5),
            Err(GridError::InvalidDimensions { cells_x: 0, cells_y: 5 })
        );
        assert!(Grid::new(5, 0).is_err());
    }

    #[test]
    fn overflowing_dimensions_rejected() {
        assert_eq!(
            Grid::new(usize::MAX, 2),
            Err(GridError::TooLarge { cells_x: usize::MAX, cells_y: 2 })
        );
    }

    #[test]
    fn out_of_bounds_reads_are_none() {
        let grid = Grid::new(2, 2).unwrap();
        assert_eq!(grid.get(1, 1), Some(Cell::Dead));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn toggle_flips_and_reports_new_state() {
        let mut grid = Grid::new(3, 3).unwrap();
        assert_eq!(grid.toggle(1, 2).unwrap(), Cell::Alive);
        assert_eq!(grid.get(1, 2), Some(Cell::Alive));
        assert_eq!(grid.toggle(1, 2).unwrap(), Cell::Dead);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn toggle_out_of_bounds_leaves_grid_untouched() {
        let mut grid = Grid::from_pattern("#.\n.#").unwrap();
        let before = grid.clone();
        let err = grid.toggle(2, 0).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds { row: 2, col: 0, cells_x: 2, cells_y: 2 }
        );
        assert_eq!(grid, before);
        assert!(grid.set(0, 5, Cell::Alive).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn seeded_grid_asks_every_cell_in_row_order() {
        let mut visited = Vec::new();
        let mut seeder = |row: usize, col: usize| {
            visited.push((row, col));
            row == col
        };
        let grid = Grid::seeded(2, 2, &mut seeder).unwrap();
        assert_eq!(visited, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(grid.alive_cells().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);

        let empty = Grid::seeded(3, 2, &mut DeadSeeder).unwrap();
        assert_eq!(empty.population(), 0);
    }

    #[test]
    fn pattern_round_trips_through_display() {
        let text = ".#.\n##.\n...\n";
        let grid = Grid::from_pattern(text).unwrap();
        assert_eq!(grid.dimensions(), (3, 3));
        assert_eq!(grid.population(), 3);
        assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn pattern_accepts_o_and_indentation() {
        let grid = Grid::from_pattern("\n   O.\n   .O\n").unwrap();
        assert_eq!(grid.alive_cells().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn ragged_pattern_rejected() {
        let err = Grid::from_pattern("##\n#").unwrap_err();
        assert!(matches!(err, GridError::Pattern { line: 2, .. }));
    }

    #[test]
    fn unknown_pattern_character_rejected() {
        let err = Grid::from_pattern("#x").unwrap_err();
        assert!(matches!(err, GridError::Pattern { line: 1, .. }));
    }

    #[test]
    fn empty_pattern_rejected() {
        assert!(Grid::from_pattern("  \n\n").is_err());
    }

    #[test]
    fn map_preserves_shape() {
        let grid = Grid::new(5, 2).unwrap();
        let flipped = grid.map(|_, _, cell| cell.toggled());
        assert_eq!(flipped.dimensions(), (5, 2));
        assert_eq!(flipped.population(), 10);
        assert_eq!(flipped.rows().collect::<Vec<_>>()[1].len(), 5);
    }
}
