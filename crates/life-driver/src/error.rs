//! Error types for the `life` binary.
//!
//! [`DriverError`] wraps every failure that can stop start-up or the run,
//! giving `main` a single type to propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the `life` binary.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: life_core::config::ConfigError,
    },

    /// The file named by `LIFE_CONFIG` does not exist.
    #[error("config file {} not found", path.display())]
    ConfigNotFound {
        /// Path taken from the environment.
        path: PathBuf,
    },

    /// Building the engine or the first grid failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: life_core::EngineError,
    },

    /// The game loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: life_core::RunnerError,
    },

    /// The runner task panicked or was cancelled.
    #[error("runner task failed: {message}")]
    Join {
        /// Description of the join failure.
        message: String,
    },

    /// Reading the console failed.
    #[error("console error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
