//! Configuration loading and typed config structures for the Life simulation.
//!
//! The configuration lives in a YAML file (`life-config.yaml` by default).
//! Every field has a default, so a missing section or an empty file yields a
//! runnable 50x50 game. [`LifeConfig::validate`] enforces the positivity
//! rules the engine and the driver rely on.

use std::path::Path;

use serde::Deserialize;

use crate::seed::DEFAULT_ALIVE_PROBABILITY;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LifeConfig {
    /// Grid dimensions and seeding.
    #[serde(default)]
    pub grid: GridConfig,

    /// Policy flags for end-of-game detection and clearing.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Auto-advance timer and driver behaviour.
    #[serde(default)]
    pub driver: DriverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LifeConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.cells_x == 0 || self.grid.cells_y == 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "grid dimensions must be positive, got {}x{}",
                    self.grid.cells_x, self.grid.cells_y
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.grid.alive_probability) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "grid.alive_probability must be within [0, 1], got {}",
                    self.grid.alive_probability
                ),
            });
        }
        if self.driver.delay_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "driver.delay_ms must be positive".to_owned(),
            });
        }
        Ok(())
    }

    /// The subset of settings the engine itself needs.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            alive_probability: self.grid.alive_probability,
            seed: self.grid.seed,
            end_on_extinction: self.rules.end_on_extinction,
            clear_mode: self.rules.clear_mode,
        }
    }
}

/// Grid dimensions and random seeding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    /// Columns of the initial grid.
    #[serde(default = "default_cells")]
    pub cells_x: usize,

    /// Rows of the initial grid.
    #[serde(default = "default_cells")]
    pub cells_y: usize,

    /// Probability that a seeded cell starts alive.
    #[serde(default = "default_alive_probability")]
    pub alive_probability: f64,

    /// Fixed random seed. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cells_x: default_cells(),
            cells_y: default_cells(),
            alive_probability: default_alive_probability(),
            seed: None,
        }
    }
}

/// How [`clear_grid`] rebuilds the grid.
///
/// [`clear_grid`]: crate::engine::SimulationEngine::clear_grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearMode {
    /// Seed a fresh random grid, like a new game.
    #[default]
    Reseed,
    /// Reset every cell to dead.
    Empty,
}

/// Engine policy flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// End the game when a generation leaves no alive cell.
    #[serde(default = "default_true")]
    pub end_on_extinction: bool,

    /// Behaviour of the clear operation.
    #[serde(default)]
    pub clear_mode: ClearMode,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            end_on_extinction: true,
            clear_mode: ClearMode::default(),
        }
    }
}

/// Auto-advance timer settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriverConfig {
    /// Milliseconds between generations while playing.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Stop the driver after this many generations (0 = unlimited).
    #[serde(default)]
    pub max_generations: u64,

    /// Start playing immediately instead of waiting for a play command.
    #[serde(default)]
    pub autoplay: bool,

    /// Print the grid after every generation.
    #[serde(default = "default_true")]
    pub render: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_generations: 0,
            autoplay: false,
            render: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Settings consumed by [`SimulationEngine`].
///
/// [`SimulationEngine`]: crate::engine::SimulationEngine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Probability that a seeded cell starts alive.
    pub alive_probability: f64,
    /// Fixed random seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// End the game when a generation leaves no alive cell.
    pub end_on_extinction: bool,
    /// Behaviour of the clear operation.
    pub clear_mode: ClearMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alive_probability: DEFAULT_ALIVE_PROBABILITY,
            seed: None,
            end_on_extinction: true,
            clear_mode: ClearMode::Reseed,
        }
    }
}

const fn default_cells() -> usize {
    50
}

const fn default_alive_probability() -> f64 {
    DEFAULT_ALIVE_PROBABILITY
}

const fn default_delay_ms() -> u64 {
    100
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    String::from("info")
}
