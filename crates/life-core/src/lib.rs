//! Grid, rule, engine lifecycle and game runner for the Life simulation.
//!
//! This crate owns Conway's Game of Life: a bounded grid of cells that
//! evolves under the B3/S23 rule, an engine that mediates every change
//! through event channels, and a timed loop that a controller drives
//! through shared operator state.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration loading into strongly-typed structs,
//!   including the end-of-game and clear policy flags.
//! - [`engine`] -- [`SimulationEngine`]: grid ownership, lifecycle state
//!   machine, and event publication.
//! - [`events`] -- Payload types the engine publishes.
//! - [`grid`] -- [`Grid`] and [`Cell`], the dense rectangular cell matrix.
//! - [`operator`] -- [`OperatorState`]: play/pause, delay, stop and the
//!   command queue shared between a controller and the runner.
//! - [`rule`] -- Neighbor counting and the next-generation computation.
//! - [`runner`] -- [`run_game`], the auto-advance loop.
//! - [`seed`] -- [`CellSeeder`] and its random and deterministic
//!   implementations.
//!
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`Grid`]: grid::Grid
//! [`Cell`]: grid::Cell
//! [`OperatorState`]: operator::OperatorState
//! [`run_game`]: runner::run_game
//! [`CellSeeder`]: seed::CellSeeder

pub mod config;
pub mod engine;
pub mod events;
pub mod grid;
pub mod operator;
pub mod rule;
pub mod runner;
pub mod seed;

// Re-export primary types at crate root.
pub use config::{ClearMode, EngineConfig, LifeConfig};
pub use engine::{EngineError, EngineState, GenerationSummary, SimulationEngine};
pub use grid::{Cell, Grid, GridError};
pub use operator::{Command, EndReason, OperatorState};
pub use runner::{GameResult, RunnerError, run_game};
