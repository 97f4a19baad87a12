//! Console front end for the Life simulation.
//!
//! Wires the engine, the runner task, the text view and the console
//! controller together.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `LIFE_CONFIG` or `life-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the engine and attach the board view
//! 4. Create the first grid
//! 5. Create operator state, spawn the runner
//! 6. Read console commands until `quit`, end of input or the runner returns
//! 7. Log the result

mod console;
mod controller;
mod error;
mod input;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use life_core::config::LifeConfig;
use life_core::{OperatorState, SimulationEngine, runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::controller::Controller;
use crate::error::DriverError;
use crate::render::BoardView;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "LIFE_CONFIG";

/// Config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "life-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, engine start-up, the console or the
/// runner fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("life starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        cells_x = config.grid.cells_x,
        cells_y = config.grid.cells_y,
        alive_probability = config.grid.alive_probability,
        seed = ?config.grid.seed,
        end_on_extinction = config.rules.end_on_extinction,
        clear_mode = ?config.rules.clear_mode,
        "Simulation settings"
    );

    // 3. Build the engine and attach the view.
    let mut engine = SimulationEngine::new(&config.engine_config()).map_err(DriverError::from)?;
    let operator = Arc::new(OperatorState::new(
        config.driver.delay_ms,
        config.driver.max_generations,
    ));
    let view = BoardView::shared();
    render::attach(&mut engine, &view, &operator, config.driver.render);

    // 4. Create the first grid.
    engine
        .create_grid_matrix(config.grid.cells_x, config.grid.cells_y)
        .map_err(DriverError::from)?;
    if config.driver.render {
        println!("{}", render::lock(&view)?.render());
    }

    // 5. Start the runner.
    if config.driver.autoplay {
        operator.resume();
    }
    info!(
        delay_ms = operator.delay_ms(),
        max_generations = operator.max_generations(),
        autoplay = config.driver.autoplay,
        "Operator state initialized"
    );

    let runner_operator = Arc::clone(&operator);
    let mut runner_task =
        tokio::spawn(async move { runner::run_game(&mut engine, &runner_operator).await });

    // 6. Console until quit, end of input or the runner returns by itself.
    let mut controller = Controller::new(
        Arc::clone(&operator),
        config.grid.cells_x,
        config.grid.cells_y,
    );
    let lines = console::spawn_stdin_reader().map_err(DriverError::from)?;
    let joined = tokio::select! {
        joined = &mut runner_task => joined,
        console = console::run(lines, &mut controller, &view) => {
            operator.request_stop();
            console.map_err(DriverError::from)?;
            runner_task.await
        }
    };
    let result = joined
        .map_err(|e| DriverError::Join {
            message: e.to_string(),
        })?
        .map_err(DriverError::from)?;

    // 7. Log results.
    runner::log_game_end(&result);
    info!(
        end_reason = ?result.end_reason,
        generations = result.generations,
        elapsed_seconds = operator.elapsed_seconds(),
        "life shutdown complete"
    );

    Ok(())
}

/// Load the configuration.
///
/// A path in `LIFE_CONFIG` must exist. Without it, `life-config.yaml` in the
/// working directory is used if present, defaults otherwise. Returns the
/// path that was read, if any.
fn load_config() -> Result<(LifeConfig, Option<PathBuf>), DriverError> {
    load_config_from(
        std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        Path::new(DEFAULT_CONFIG_PATH),
    )
}

fn load_config_from(
    explicit: Option<PathBuf>,
    default_path: &Path,
) -> Result<(LifeConfig, Option<PathBuf>), DriverError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(DriverError::ConfigNotFound { path });
        }
        let config = LifeConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    if default_path.exists() {
        let config = LifeConfig::from_file(default_path)?;
        Ok((config, Some(default_path.to_path_buf())))
    } else {
        Ok((LifeConfig::default(), None))
    }
}
