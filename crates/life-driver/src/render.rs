//! Text view of the board, kept current by engine events.
//!
//! [`BoardView`] mirrors the engine's grid from [`GridCreated`] and
//! [`CellChanged`] alone, the way a UI rebuilds its cells. The runner task
//! fires the listeners, the console reads the view, so it sits behind a
//! [`std::sync::Mutex`] that is never held across an await.

use std::sync::{Arc, Mutex, MutexGuard};

use life_core::events::{CellChanged, GameEnded, GenerationAdvanced, GridCreated};
use life_core::{Grid, OperatorState, SimulationEngine};
use life_events::ListenerError;
use tracing::info;

/// View state shared between listeners and the console.
pub type SharedView = Arc<Mutex<BoardView>>;

/// What a front end shows: the board, its generation and the game-over flag.
#[derive(Debug, Default)]
pub struct BoardView {
    board: Option<Grid>,
    generation: u64,
    game_over: bool,
}

impl BoardView {
    /// Create an empty view wrapped for sharing.
    pub fn shared() -> SharedView {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Rebuild an all-dead board of the new size and hide the game-over line.
    pub fn grid_created(&mut self, event: &GridCreated) -> Result<(), ListenerError> {
        let board = Grid::new(event.cells_x, event.cells_y)
            .map_err(|e| ListenerError::new(e.to_string()))?;
        self.board = Some(board);
        self.generation = 0;
        self.game_over = false;
        Ok(())
    }

    /// Apply one cell change.
    pub fn cell_changed(&mut self, event: &CellChanged) -> Result<(), ListenerError> {
        let board = self
            .board
            .as_mut()
            .ok_or_else(|| ListenerError::new("cell changed before any grid was created"))?;
        board
            .set(event.row, event.col, event.cell)
            .map_err(|e| ListenerError::new(e.to_string()))
    }

    /// Record the new generation number.
    pub const fn generation_advanced(&mut self, event: &GenerationAdvanced) {
        self.generation = event.generation;
    }

    /// Show the game-over line.
    pub const fn game_ended(&mut self) {
        self.game_over = true;
    }

    /// The mirrored board, once a grid exists.
    pub const fn board(&self) -> Option<&Grid> {
        self.board.as_ref()
    }

    /// Generation shown.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Alive cells on the mirrored board.
    pub fn population(&self) -> usize {
        self.board.as_ref().map_or(0, Grid::population)
    }

    /// Whether the game-over line is shown.
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Render a header line, the board and, if the game ended, a final line.
    pub fn render(&self) -> String {
        let Some(board) = self.board() else {
            return String::from("(no grid)\n");
        };
        let (cells_x, cells_y) = board.dimensions();
        let mut out = format!(
            "generation {} | {cells_x}x{cells_y} | population {}\n{board}",
            self.generation,
            board.population(),
        );
        if self.game_over {
            out.push_str("Game over\n");
        }
        out
    }
}

/// Lock the view, reporting a poisoned lock as a listener failure.
pub fn lock(view: &SharedView) -> Result<MutexGuard<'_, BoardView>, ListenerError> {
    view.lock().map_err(|e| ListenerError::new(e.to_string()))
}

/// Wire the view to the engine's channels.
///
/// With `print` on, the board is printed after every generation. On
/// [`GameEnded`] the game is stopped and "Game over" shown.
pub fn attach(
    engine: &mut SimulationEngine,
    view: &SharedView,
    operator: &Arc<OperatorState>,
    print: bool,
) {
    let created = Arc::clone(view);
    engine.on_grid_created(move |event| lock(&created)?.grid_created(event));

    let changed = Arc::clone(view);
    engine.on_cell_changed(move |event| lock(&changed)?.cell_changed(event));

    let advanced = Arc::clone(view);
    engine.on_generation_advanced(move |event| {
        let mut view = lock(&advanced)?;
        view.generation_advanced(event);
        if print {
            println!("{}", view.render());
        }
        Ok(())
    });

    let ended = Arc::clone(view);
    let operator = Arc::clone(operator);
    engine.on_game_ended(move |event: &GameEnded| {
        operator.pause();
        lock(&ended)?.game_ended();
        info!(generation = event.generation, "Game over");
        println!("Game over at generation {}", event.generation);
        Ok(())
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use life_core::EngineConfig;
    use life_core::seed::DeadSeeder;

    use super::*;

    fn wired_engine(end_on_extinction: bool) -> (SimulationEngine, SharedView, Arc<OperatorState>) {
        let config = EngineConfig {
            end_on_extinction,
            ..EngineConfig::default()
        };
        let mut engine = SimulationEngine::with_seeder(&config, |row: usize, col: usize| {
            (row + col) % 3 == 0
        });
        let view = BoardView::shared();
        let operator = Arc::new(OperatorState::new(100, 0));
        attach(&mut engine, &view, &operator, false);
        (engine, view, operator)
    }

    #[test]
    fn mirror_follows_creation_toggles_and_generations() {
        let (mut engine, view, _operator) = wired_engine(false);

        engine.create_grid_matrix(7, 5).unwrap();
        assert_eq!(lock(&view).unwrap().board(), engine.grid());

        engine.update_cell(2, 3).unwrap();
        engine.calculate_next_generation().unwrap();
        engine.calculate_next_generation().unwrap();

        let view = lock(&view).unwrap();
        assert_eq!(view.board(), engine.grid());
        assert_eq!(view.generation(), 2);
        assert_eq!(view.population(), engine.population());
    }

    #[test]
    fn game_over_pauses_and_new_grid_hides_it() {
        let mut engine = SimulationEngine::with_seeder(&EngineConfig::default(), DeadSeeder);
        let view = BoardView::shared();
        let operator = Arc::new(OperatorState::new(100, 0));
        attach(&mut engine, &view, &operator, false);

        engine.create_grid_matrix(3, 3).unwrap();
        operator.resume();
        engine.calculate_next_generation().unwrap();

        assert!(operator.is_paused());
        assert!(lock(&view).unwrap().is_game_over());
        assert!(lock(&view).unwrap().render().ends_with("Game over\n"));

        engine.create_grid_matrix(3, 3).unwrap();
        assert!(!lock(&view).unwrap().is_game_over());
    }

    #[test]
    fn render_shows_header_and_rows() {
        let mut view = BoardView::default();
        assert_eq!(view.render(), "(no grid)\n");

        view.grid_created(&GridCreated { cells_x: 3, cells_y: 2 }).unwrap();
        view.cell_changed(&CellChanged {
            row: 1,
            col: 0,
            cell: life_core::Cell::Alive,
        })
        .unwrap();

        assert_eq!(view.render(), "generation 0 | 3x2 | population 1\n...\n#..\n");
    }

    #[test]
    fn change_before_grid_is_a_listener_error() {
        let mut view = BoardView::default();
        let err = view
            .cell_changed(&CellChanged {
                row: 0,
                col: 0,
                cell: life_core::Cell::Alive,
            })
            .unwrap_err();
        assert!(err.message.contains("before any grid"));
    }
}
