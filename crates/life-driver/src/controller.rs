//! User intents translated into operator flags and queued commands.
//!
//! The [`Controller`] never touches the engine. Play/pause and the delay
//! are flags on the shared [`OperatorState`]; everything that changes the
//! grid is queued as a [`Command`] for the runner task.

use std::sync::Arc;

use life_core::{Command, OperatorState};
use tracing::{debug, info, warn};

use crate::input::{InputError, InputField};

/// Handles the console's play, step, clear, cell and field commands.
#[derive(Debug)]
pub struct Controller {
    operator: Arc<OperatorState>,
    width: InputField,
    height: InputField,
    delay: InputField,
    /// Dimensions of the most recently requested grid.
    cells_x: usize,
    cells_y: usize,
}

impl Controller {
    /// Create a controller for a grid of `cells_x` by `cells_y`.
    ///
    /// The width, height and delay fields start valid, holding the current
    /// dimensions and the operator's delay.
    pub fn new(operator: Arc<OperatorState>, cells_x: usize, cells_y: usize) -> Self {
        let delay = InputField::new(operator.delay_ms());
        Self {
            operator,
            width: InputField::new(to_field(cells_x)),
            height: InputField::new(to_field(cells_y)),
            delay,
            cells_x,
            cells_y,
        }
    }

    // -----------------------------------------------------------------------
    // Play / Pause
    // -----------------------------------------------------------------------

    /// Start the game if stopped, stop it if running.
    ///
    /// Returns whether the game is running afterwards.
    pub fn toggle_game(&self) -> bool {
        if self.operator.is_running() {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    /// Start the game. Refused while the delay field is invalid.
    ///
    /// Returns whether the game is running afterwards.
    pub fn play(&self) -> bool {
        if !self.delay.is_valid() {
            warn!("Delay is invalid, not starting");
            return self.operator.is_running();
        }
        self.operator.resume();
        info!(delay_ms = self.operator.delay_ms(), "Game started");
        true
    }

    /// Stop the game.
    pub fn pause(&self) {
        self.operator.pause();
        info!("Game stopped");
    }

    // -----------------------------------------------------------------------
    // Grid commands
    // -----------------------------------------------------------------------

    /// Advance exactly one generation.
    pub async fn step(&self) {
        self.operator.enqueue(Command::Step).await;
    }

    /// Stop the game and rebuild the grid with its current dimensions.
    pub async fn clear(&self) {
        self.pause();
        self.operator.enqueue(Command::Clear).await;
    }

    /// Flip one cell.
    pub async fn toggle_cell(&self, row: usize, col: usize) {
        self.operator.enqueue(Command::ToggleCell { row, col }).await;
    }

    /// Handle a new width entry.
    ///
    /// Returns `Ok(true)` if a new grid was requested. That happens only when
    /// the height field is valid and the width differs from the current one.
    pub async fn change_width(&mut self, raw: &str) -> Result<bool, InputError> {
        let cells_x = to_dimension(self.width.accept(raw)?);
        let Some(height) = self.height.value() else {
            debug!(cells_x, "Height is invalid, keeping grid");
            return Ok(false);
        };
        if cells_x == self.cells_x {
            return Ok(false);
        }
        self.resize(cells_x, to_dimension(height)).await;
        Ok(true)
    }

    /// Handle a new height entry.
    ///
    /// Returns `Ok(true)` if a new grid was requested. That happens only when
    /// the width field is valid and the height differs from the current one.
    pub async fn change_height(&mut self, raw: &str) -> Result<bool, InputError> {
        let cells_y = to_dimension(self.height.accept(raw)?);
        let Some(width) = self.width.value() else {
            debug!(cells_y, "Width is invalid, keeping grid");
            return Ok(false);
        };
        if cells_y == self.cells_y {
            return Ok(false);
        }
        self.resize(to_dimension(width), cells_y).await;
        Ok(true)
    }

    /// Handle a new delay entry.
    ///
    /// Returns `Ok(true)` if the delay changed. A running timer restarts
    /// with the new delay.
    pub fn change_delay(&mut self, raw: &str) -> Result<bool, InputError> {
        let delay_ms = self.delay.accept(raw)?;
        let changed = self
            .operator
            .set_delay_ms(delay_ms)
            .is_some_and(|previous| previous != delay_ms);
        if changed {
            info!(delay_ms, "Delay changed");
        }
        Ok(changed)
    }

    /// Ask the runner to return.
    pub fn quit(&self) {
        self.operator.request_stop();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Shared operator state.
    pub const fn operator(&self) -> &Arc<OperatorState> {
        &self.operator
    }

    /// Dimensions of the most recently requested grid.
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.cells_x, self.cells_y)
    }

    /// Whether the width, height and delay fields are valid.
    pub const fn fields_valid(&self) -> (bool, bool, bool) {
        (
            self.width.is_valid(),
            self.height.is_valid(),
            self.delay.is_valid(),
        )
    }

    async fn resize(&mut self, cells_x: usize, cells_y: usize) {
        self.cells_x = cells_x;
        self.cells_y = cells_y;
        info!(cells_x, cells_y, "New grid requested");
        self.operator
            .enqueue(Command::Resize { cells_x, cells_y })
            .await;
    }
}

/// Values too large for `usize` saturate; the engine rejects them.
fn to_dimension(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn to_field(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn controller(cells_x: usize, cells_y: usize) -> Controller {
        Controller::new(Arc::new(OperatorState::new(100, 0)), cells_x, cells_y)
    }

    #[tokio::test]
    async fn new_width_creates_grid_with_current_height() {
        let mut controller = controller(4, 12);

        assert!(controller.change_width("5").await.unwrap());

        assert_eq!(controller.dimensions(), (5, 12));
        assert_eq!(
            controller.operator().drain_commands().await,
            vec![Command::Resize { cells_x: 5, cells_y: 12 }]
        );
    }

    #[tokio::test]
    async fn unchanged_width_keeps_grid() {
        let mut controller = controller(4, 12);

        assert!(!controller.change_width("4").await.unwrap());
        assert!(!controller.change_width("4.0").await.unwrap());

        assert!(controller.operator().drain_commands().await.is_empty());
    }

    #[tokio::test]
    async fn new_height_creates_grid_with_current_width() {
        let mut controller = controller(4, 12);

        assert!(controller.change_height("7").await.unwrap());

        assert_eq!(
            controller.operator().drain_commands().await,
            vec![Command::Resize { cells_x: 4, cells_y: 7 }]
        );
    }

    #[tokio::test]
    async fn invalid_width_marks_field_and_blocks_height_changes() {
        let mut controller = controller(4, 12);

        assert!(matches!(
            controller.change_width("-2").await,
            Err(InputError::NotPositive { .. })
        ));
        assert_eq!(controller.fields_valid(), (false, true, true));

        assert!(!controller.change_height("20").await.unwrap());
        assert!(controller.operator().drain_commands().await.is_empty());

        // A valid width brings the field back and uses the new height.
        assert!(controller.change_width("6").await.unwrap());
        assert_eq!(
            controller.operator().drain_commands().await,
            vec![Command::Resize { cells_x: 6, cells_y: 20 }]
        );
    }

    #[tokio::test]
    async fn delay_change_updates_operator() {
        let mut controller = controller(4, 4);

        assert!(controller.change_delay("250").unwrap());
        assert_eq!(controller.operator().delay_ms(), 250);
        assert!(!controller.change_delay("250").unwrap());
    }

    #[tokio::test]
    async fn invalid_delay_prevents_start() {
        let mut controller = controller(4, 4);

        assert!(controller.change_delay("fast").is_err());
        assert_eq!(controller.operator().delay_ms(), 100);
        assert!(!controller.toggle_game());
        assert!(controller.operator().is_paused());

        controller.change_delay("50").unwrap();
        assert!(controller.toggle_game());
        assert!(controller.operator().is_running());
        assert!(!controller.toggle_game());
        assert!(controller.operator().is_paused());
    }

    #[tokio::test]
    async fn clear_stops_game_and_queues_clear() {
        let controller = controller(4, 4);
        controller.play();

        controller.clear().await;

        assert!(controller.operator().is_paused());
        assert_eq!(controller.operator().drain_commands().await, vec![Command::Clear]);
    }

    #[tokio::test]
    async fn step_and_toggle_are_queued_in_order() {
        let controller = controller(4, 4);

        controller.toggle_cell(1, 2).await;
        controller.step().await;

        assert_eq!(
            controller.operator().drain_commands().await,
            vec![Command::ToggleCell { row: 1, col: 2 }, Command::Step]
        );
    }

    #[test]
    fn quit_requests_stop() {
        let controller = controller(4, 4);
        controller.quit();
        assert!(controller.operator().is_stop_requested());
    }
}
