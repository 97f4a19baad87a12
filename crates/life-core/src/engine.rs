//! The simulation engine: grid ownership, lifecycle and notifications.
//!
//! [`SimulationEngine`] is the single owner of the grid. Callers change it
//! only through three operations, [`create_grid_matrix`],
//! [`update_cell`] and [`calculate_next_generation`], plus the
//! [`clear_grid`] and [`load_grid`] conveniences. Every change is announced
//! through an [`EventChannel`].
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --create/load--> Ready --update/step--> Ready
//!                                  |
//!                                  +--empty generation (policy on)--> Ended
//!                                                                       |
//!                          Ready <--create/load/clear--------------------+
//! ```
//!
//! The engine has no notion of "playing". Timed auto-advance belongs to the
//! caller, see [`crate::runner`].
//!
//! [`create_grid_matrix`]: SimulationEngine::create_grid_matrix
//! [`update_cell`]: SimulationEngine::update_cell
//! [`calculate_next_generation`]: SimulationEngine::calculate_next_generation
//! [`clear_grid`]: SimulationEngine::clear_grid
//! [`load_grid`]: SimulationEngine::load_grid

use std::fmt;
use std::sync::Arc;

use life_events::{EventChannel, ListenerError, ListenerId};
use tracing::{debug, info};

use crate::config::{ClearMode, EngineConfig};
use crate::events::{CellChanged, GameEnded, GenerationAdvanced, GridCreated};
use crate::grid::{Cell, Grid, GridError};
use crate::rule;
use crate::seed::{CellSeeder, RandomSeeder, SeedError};

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid dimensions, out-of-range coordinates or a bad pattern.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },

    /// The random seeder could not be built.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying seeder error.
        #[from]
        source: SeedError,
    },

    /// No grid has been created yet.
    #[error("no grid has been created yet")]
    Uninitialized,

    /// The game ended; a new grid must be created first.
    #[error("the game has ended; create a new grid to continue")]
    GameEnded,

    /// The generation counter would overflow.
    #[error("generation counter overflow")]
    GenerationOverflow,
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No grid yet.
    Uninitialized,
    /// A grid exists and can be edited or advanced.
    Ready,
    /// A generation left no alive cell and the end-of-game policy is on.
    Ended,
}

/// Result of one [`SimulationEngine::calculate_next_generation`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Generation number after the advance.
    pub generation: u64,
    /// Alive cells in the new grid.
    pub population: usize,
    /// Cells whose state flipped.
    pub changed: usize,
    /// Whether this generation ended the game.
    pub ended: bool,
}

/// Owns the grid, applies the rule and publishes state changes.
pub struct SimulationEngine {
    /// Current grid. Shared with observers only as read-only snapshots.
    grid: Option<Arc<Grid>>,
    state: EngineState,
    generation: u64,
    seeder: Box<dyn CellSeeder>,
    end_on_extinction: bool,
    clear_mode: ClearMode,
    grid_created: EventChannel<GridCreated>,
    cell_changed: EventChannel<CellChanged>,
    game_ended: EventChannel<GameEnded>,
    generation_advanced: EventChannel<GenerationAdvanced>,
}

impl SimulationEngine {
    /// Create an engine that seeds grids with a [`RandomSeeder`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Seed`] if the alive probability is invalid.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let seeder = RandomSeeder::new(config.alive_probability, config.seed)?;
        Ok(Self::with_seeder(config, seeder))
    }

    /// Create an engine with a caller-supplied seeder.
    pub fn with_seeder(config: &EngineConfig, seeder: impl CellSeeder + 'static) -> Self {
        Self {
            grid: None,
            state: EngineState::Uninitialized,
            generation: 0,
            seeder: Box::new(seeder),
            end_on_extinction: config.end_on_extinction,
            clear_mode: config.clear_mode,
            grid_created: EventChannel::new("grid_created"),
            cell_changed: EventChannel::new("cell_changed"),
            game_ended: EventChannel::new("game_ended"),
            generation_advanced: EventChannel::new("generation_advanced"),
        }
    }

    /// Replace the seeder used by future grid creations.
    pub fn set_seeder(&mut self, seeder: impl CellSeeder + 'static) {
        self.seeder = Box::new(seeder);
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Replace the grid with a freshly seeded `cells_y` x `cells_x` one.
    ///
    /// Resets the generation counter and publishes [`GridCreated`] once,
    /// then [`CellChanged`] for each cell seeded alive.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Grid`] if either dimension is zero or too
    /// large. The current grid is kept in that case.
    pub fn create_grid_matrix(&mut self, cells_x: usize, cells_y: usize) -> Result<(), EngineError> {
        let grid = Grid::seeded(cells_x, cells_y, &mut *self.seeder)?;
        self.install(grid);
        Ok(())
    }

    /// Flip the cell at `(row, col)` and publish [`CellChanged`].
    ///
    /// Returns the cell's new state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Grid`] for out-of-range coordinates (the grid
    /// is left untouched), [`EngineError::Uninitialized`] before the first
    /// grid and [`EngineError::GameEnded`] after the game ended.
    pub fn update_cell(&mut self, row: usize, col: usize) -> Result<Cell, EngineError> {
        self.require_ready()?;
        let grid = self.grid.as_mut().ok_or(EngineError::Uninitialized)?;
        if !grid.contains(row, col) {
            return Err(GridError::OutOfBounds {
                row,
                col,
                cells_x: grid.cells_x(),
                cells_y: grid.cells_y(),
            }
            .into());
        }

        let cell = Arc::make_mut(grid).toggle(row, col)?;
        debug!(row, col, ?cell, "Cell toggled");
        self.cell_changed.notify(&CellChanged { row, col, cell });
        Ok(cell)
    }

    /// Advance the grid by one generation.
    ///
    /// The new grid is computed from a complete snapshot of the current one
    /// and installed in a single step before any listener runs. Then
    /// [`CellChanged`] fires for every flipped cell, followed by
    /// [`GenerationAdvanced`]. When the end-of-game policy is on and the new
    /// grid is empty, the engine moves to [`EngineState::Ended`] and
    /// publishes [`GameEnded`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Uninitialized`] before the first grid,
    /// [`EngineError::GameEnded`] after the game ended and
    /// [`EngineError::GenerationOverflow`] if the counter is exhausted.
    pub fn calculate_next_generation(&mut self) -> Result<GenerationSummary, EngineError> {
        self.require_ready()?;
        let current = self.grid.as_ref().ok_or(EngineError::Uninitialized)?;
        let generation = self
            .generation
            .checked_add(1)
            .ok_or(EngineError::GenerationOverflow)?;

        let next = Arc::new(rule::next_generation(current));
        let changes: Vec<CellChanged> = current
            .iter()
            .zip(next.iter())
            .filter(|((_, _, before), (_, _, after))| before != after)
            .map(|(_, (row, col, cell))| CellChanged { row, col, cell })
            .collect();

        self.grid = Some(Arc::clone(&next));
        self.generation = generation;

        let population = next.population();
        let ended = self.end_on_extinction && population == 0;
        debug!(generation, population, changed = changes.len(), "Generation advanced");

        for change in &changes {
            self.cell_changed.notify(change);
        }
        self.generation_advanced.notify(&GenerationAdvanced {
            generation,
            population,
            changed: changes.len(),
            snapshot: next,
        });

        if ended {
            self.state = EngineState::Ended;
            info!(generation, "No cells left alive -- game ended");
            self.game_ended.notify(&GameEnded { generation });
        }

        Ok(GenerationSummary {
            generation,
            population,
            changed: changes.len(),
            ended,
        })
    }

    /// Rebuild the grid with the current dimensions.
    ///
    /// [`ClearMode::Reseed`] seeds a new random grid like a new game;
    /// [`ClearMode::Empty`] resets every cell to dead. Publishes
    /// [`GridCreated`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Uninitialized`] before the first grid.
    pub fn clear_grid(&mut self) -> Result<(), EngineError> {
        let (cells_x, cells_y) = self.dimensions().ok_or(EngineError::Uninitialized)?;
        let grid = match self.clear_mode {
            ClearMode::Reseed => Grid::seeded(cells_x, cells_y, &mut *self.seeder)?,
            ClearMode::Empty => Grid::new(cells_x, cells_y)?,
        };
        self.install(grid);
        Ok(())
    }

    /// Install a caller-built grid, e.g. a parsed pattern.
    ///
    /// Behaves like [`create_grid_matrix`](Self::create_grid_matrix) without
    /// seeding.
    pub fn load_grid(&mut self, grid: Grid) {
        self.install(grid);
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Attach a listener for [`GridCreated`].
    pub fn on_grid_created<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GridCreated) -> Result<(), ListenerError> + Send + 'static,
    {
        self.grid_created.attach(listener)
    }

    /// Attach a listener for [`CellChanged`].
    pub fn on_cell_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&CellChanged) -> Result<(), ListenerError> + Send + 'static,
    {
        self.cell_changed.attach(listener)
    }

    /// Attach a listener for [`GameEnded`].
    pub fn on_game_ended<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEnded) -> Result<(), ListenerError> + Send + 'static,
    {
        self.game_ended.attach(listener)
    }

    /// Attach a listener for [`GenerationAdvanced`].
    pub fn on_generation_advanced<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GenerationAdvanced) -> Result<(), ListenerError> + Send + 'static,
    {
        self.generation_advanced.attach(listener)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current lifecycle state.
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Generations advanced since the grid was last (re)created.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// `(cells_x, cells_y)` of the current grid.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.grid.as_deref().map(Grid::dimensions)
    }

    /// Alive cells in the current grid (0 before the first grid).
    pub fn population(&self) -> usize {
        self.grid.as_deref().map_or(0, Grid::population)
    }

    /// Cell at `(row, col)`, or `None` if out of range or uninitialized.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.as_deref().and_then(|grid| grid.get(row, col))
    }

    /// Borrow the current grid.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_deref()
    }

    /// Read-only snapshot of the current grid.
    ///
    /// Later edits never show through a snapshot: the engine copies the grid
    /// before mutating it while a snapshot is alive.
    pub fn snapshot(&self) -> Option<Arc<Grid>> {
        self.grid.clone()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    const fn require_ready(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready => Ok(()),
            EngineState::Uninitialized => Err(EngineError::Uninitialized),
            EngineState::Ended => Err(EngineError::GameEnded),
        }
    }

    /// Swap in a new grid, then announce it: [`GridCreated`] first, followed
    /// by one [`CellChanged`] per alive cell so observers that rebuilt an
    /// empty view can fill it in.
    fn install(&mut self, grid: Grid) {
        let (cells_x, cells_y) = grid.dimensions();
        let alive: Vec<CellChanged> = grid
            .alive_cells()
            .map(|(row, col)| CellChanged {
                row,
                col,
                cell: Cell::Alive,
            })
            .collect();
        info!(cells_x, cells_y, population = alive.len(), "Grid created");

        self.grid = Some(Arc::new(grid));
        self.generation = 0;
        self.state = EngineState::Ready;

        self.grid_created.notify(&GridCreated { cells_x, cells_y });
        for change in &alive {
            self.cell_changed.notify(change);
        }
    }
}

impl fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("dimensions", &self.dimensions())
            .field("end_on_extinction", &self.end_on_extinction)
            .field("clear_mode", &self.clear_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::seed::DeadSeeder;

    fn dead_engine() -> SimulationEngine {
        SimulationEngine::with_seeder(&EngineConfig::default(), DeadSeeder)
    }

    #[test]
    fn starts_uninitialized() {
        let mut engine = dead_engine();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.grid().is_none());
        assert!(matches!(engine.update_cell(0, 0), Err(EngineError::Uninitialized)));
        assert!(matches!(
            engine.calculate_next_generation(),
            Err(EngineError::Uninitialized)
        ));
        assert!(matches!(engine.clear_grid(), Err(EngineError::Uninitialized)));
    }

    #[test]
    fn invalid_dimensions_keep_current_grid() {
        let mut engine = dead_engine();
        engine.create_grid_matrix(3, 2).unwrap();
        let err = engine.create_grid_matrix(0, 4).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Grid {
                source: GridError::InvalidDimensions { cells_x: 0, cells_y: 4 }
            }
        ));
        assert_eq!(engine.dimensions(), Some((3, 2)));
    }

    #[test]
    fn create_uses_injected_seeder() {
        let mut engine = SimulationEngine::with_seeder(&EngineConfig::default(), |row: usize, _col: usize| row == 0);
        engine.create_grid_matrix(4, 3).unwrap();
        assert_eq!(engine.population(), 4);
        assert_eq!(engine.cell(0, 3), Some(Cell::Alive));
        assert_eq!(engine.cell(1, 0), Some(Cell::Dead));
    }

    #[test]
    fn seeded_engines_are_reproducible() {
        let config = EngineConfig {
            seed: Some(1234),
            ..EngineConfig::default()
        };
        let mut a = SimulationEngine::new(&config).unwrap();
        let mut b = SimulationEngine::new(&config).unwrap();
        a.create_grid_matrix(30, 20).unwrap();
        b.create_grid_matrix(30, 20).unwrap();
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn invalid_probability_rejected() {
        let config = EngineConfig {
            alive_probability: 2.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            SimulationEngine::new(&config),
            Err(EngineError::Seed { .. })
        ));
    }

    #[test]
    fn snapshot_is_isolated_from_later_toggles() {
        let mut engine = dead_engine();
        engine.create_grid_matrix(2, 2).unwrap();
        let before = engine.snapshot().unwrap();
        engine.update_cell(1, 1).unwrap();
        assert_eq!(before.get(1, 1), Some(Cell::Dead));
        assert_eq!(engine.cell(1, 1), Some(Cell::Alive));
    }

    #[test]
    fn generation_counter_resets_on_new_grid() {
        let mut engine = SimulationEngine::with_seeder(
            &EngineConfig {
                end_on_extinction: false,
                ..EngineConfig::default()
            },
            DeadSeeder,
        );
        engine.create_grid_matrix(3, 3).unwrap();
        engine.calculate_next_generation().unwrap();
        engine.calculate_next_generation().unwrap();
        assert_eq!(engine.generation(), 2);
        engine.create_grid_matrix(3, 3).unwrap();
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn flipped_cells_are_announced_after_the_swap() {
        let mut engine = dead_engine();
        engine.load_grid(Grid::from_pattern(".....\n.....\n.###.\n.....\n.....").unwrap());

        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        engine.on_cell_changed(move |change| {
            sink.lock().unwrap().push(*change);
            Ok(())
        });

        let summary = engine.calculate_next_generation().unwrap();
        assert_eq!(summary.changed, 4);
        assert_eq!(
            *changes.lock().unwrap(),
            vec![
                CellChanged { row: 1, col: 2, cell: Cell::Alive },
                CellChanged { row: 2, col: 1, cell: Cell::Dead },
                CellChanged { row: 2, col: 3, cell: Cell::Dead },
                CellChanged { row: 3, col: 2, cell: Cell::Alive },
            ]
        );
    }

    #[test]
    fn generation_advanced_carries_snapshot() {
        let mut engine = dead_engine();
        engine.load_grid(Grid::from_pattern("##\n##").unwrap());

        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        engine.on_generation_advanced(move |event| {
            *sink.lock().unwrap() = Some(event.clone());
            Ok(())
        });

        engine.calculate_next_generation().unwrap();
        let event = seen.lock().unwrap().clone().unwrap();
        assert_eq!(event.generation, 1);
        assert_eq!(event.population, 4);
        assert_eq!(event.changed, 0);
        assert_eq!(event.snapshot.as_ref(), engine.grid().unwrap());
    }

    #[test]
    fn new_grid_announces_seeded_cells_after_creation() {
        let mut engine =
            SimulationEngine::with_seeder(&EngineConfig::default(), |row: usize, col: usize| row == col);
        let log = Arc::new(Mutex::new(Vec::new()));

        let created = Arc::clone(&log);
        engine.on_grid_created(move |event| {
            created
                .lock()
                .unwrap()
                .push(format!("created {}x{}", event.cells_x, event.cells_y));
            Ok(())
        });
        let changed = Arc::clone(&log);
        engine.on_cell_changed(move |event| {
            changed
                .lock()
                .unwrap()
                .push(format!("alive {},{}", event.row, event.col));
            Ok(())
        });

        engine.create_grid_matrix(3, 2).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["created 3x2", "alive 0,0", "alive 1,1"]
        );
    }

    #[test]
    fn failing_listener_does_not_block_the_engine() {
        let mut engine = dead_engine();
        engine.on_grid_created(|_| Err(ListenerError::new("view not ready")));
        engine.create_grid_matrix(2, 2).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[test]
    fn debug_output_omits_listeners() {
        let mut engine = dead_engine();
        engine.create_grid_matrix(2, 3).unwrap();
        let text = format!("{engine:?}");
        assert!(text.contains("Ready"));
        assert!(text.contains("(2, 3)"));
    }
}
