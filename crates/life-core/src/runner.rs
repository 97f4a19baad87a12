//! Timed game loop with operator controls.
//!
//! This module provides [`run_game`], the async task that owns the engine
//! and drives it on behalf of a controller:
//!
//! - **Queued commands**: step, toggle, clear, resize and load requests are
//!   applied in order at the top of every loop iteration
//! - **Play/pause**: while paused the loop sleeps until signalled
//! - **Single timer**: while playing, one interruptible sleep per generation;
//!   any signal (delay change, pause, command) restarts it
//! - **Game over**: when the engine reports an empty grid the loop pauses
//!   itself and keeps serving commands
//! - **Bounded run**: returns on a stop request or after `max_generations`

use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::{EngineError, SimulationEngine};
use crate::operator::{Command, EndReason, OperatorState};

/// Errors that end the game loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The engine failed in a way that cannot be skipped.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },
}

/// Outcome of [`run_game`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Why the loop returned.
    pub end_reason: EndReason,
    /// Generation counter of the final grid.
    pub generations: u64,
    /// Alive cells in the final grid.
    pub final_population: usize,
}

/// Run the game loop until a stop request or the generation limit.
///
/// # Errors
///
/// Returns [`RunnerError`] only for engine failures that cannot be skipped
/// (generation counter overflow). Rejected commands, such as out-of-range
/// toggles, are logged and dropped.
pub async fn run_game(
    engine: &mut SimulationEngine,
    operator: &Arc<OperatorState>,
) -> Result<GameResult, RunnerError> {
    info!(
        delay_ms = operator.delay_ms(),
        max_generations = operator.max_generations(),
        paused = operator.is_paused(),
        "Game loop starting"
    );

    loop {
        // --- Apply queued commands ---
        for command in operator.drain_commands().await {
            apply_command(engine, operator, command)?;
        }

        // --- Check stop request ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return finish(
                engine.generation(),
                engine.population(),
                operator,
                EndReason::OperatorStop,
            )
            .await;
        }

        // --- Check generation limit ---
        if operator.generation_limit_reached(engine.generation()) {
            info!(
                generation = engine.generation(),
                max_generations = operator.max_generations(),
                "Generation limit reached"
            );
            return finish(
                engine.generation(),
                engine.population(),
                operator,
                EndReason::MaxGenerationsReached,
            )
            .await;
        }

        // --- Wait while paused ---
        if operator.is_paused() {
            operator.wait_for_signal().await;
            continue;
        }

        // --- Sleep for the delay; any signal restarts the timer ---
        if !operator.sleep_or_signal(operator.delay_ms()).await {
            continue;
        }

        advance(engine, operator)?;
    }
}

/// Apply one queued command.
fn apply_command(
    engine: &mut SimulationEngine,
    operator: &OperatorState,
    command: Command,
) -> Result<(), RunnerError> {
    let result = match command {
        Command::Step => return advance(engine, operator),
        Command::ToggleCell { row, col } => engine.update_cell(row, col).map(|_| ()),
        Command::Clear => engine.clear_grid(),
        Command::Resize { cells_x, cells_y } => engine.create_grid_matrix(cells_x, cells_y),
        Command::Load(grid) => {
            engine.load_grid(grid);
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!(error = %e, "Command rejected");
    }
    Ok(())
}

/// Advance one generation, pausing when the game ends.
fn advance(engine: &mut SimulationEngine, operator: &OperatorState) -> Result<(), RunnerError> {
    match engine.calculate_next_generation() {
        Ok(summary) => {
            if summary.ended {
                info!(generation = summary.generation, "Game over, pausing");
                operator.pause();
            }
            Ok(())
        }
        Err(e @ (EngineError::GameEnded | EngineError::Uninitialized)) => {
            warn!(error = %e, "Cannot advance, pausing");
            operator.pause();
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Record the end reason and build the result.
///
/// Takes the engine's figures by value. The engine is not `Sync`, so no
/// reference to it may be held across an await.
async fn finish(
    generations: u64,
    final_population: usize,
    operator: &OperatorState,
    end_reason: EndReason,
) -> Result<GameResult, RunnerError> {
    operator.set_end_reason(end_reason).await;
    Ok(GameResult {
        end_reason,
        generations,
        final_population,
    })
}

/// Log the outcome of a finished game.
pub fn log_game_end(result: &GameResult) {
    info!(
        reason = ?result.end_reason,
        generations = result.generations,
        final_population = result.final_population,
        "Game loop ended"
    );
}
