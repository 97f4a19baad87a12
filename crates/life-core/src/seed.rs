//! Injectable sources of initial cell states.
//!
//! New grids are seeded cell by cell through the [`CellSeeder`] trait so the
//! engine never depends on a particular random source. Production code uses
//! [`RandomSeeder`]; tests plug in [`DeadSeeder`] or a closure for fully
//! deterministic grids.

use rand::SeedableRng;
use rand::distr::{Bernoulli, Distribution};
use rand::rngs::StdRng;

/// Default probability that a freshly seeded cell is alive.
pub const DEFAULT_ALIVE_PROBABILITY: f64 = 0.3;

/// Errors that can occur when building a seeder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeedError {
    /// The alive probability is not a number in `[0, 1]`.
    #[error("alive probability must be within [0, 1], got {probability}")]
    InvalidProbability {
        /// The rejected probability.
        probability: f64,
    },
}

/// Decides whether each cell of a new grid starts alive.
pub trait CellSeeder: Send {
    /// Called once per cell, row by row, when a grid is seeded.
    fn is_alive(&mut self, row: usize, col: usize) -> bool;
}

impl<F> CellSeeder for F
where
    F: FnMut(usize, usize) -> bool + Send,
{
    fn is_alive(&mut self, row: usize, col: usize) -> bool {
        self(row, col)
    }
}

/// Seeder that leaves every cell dead.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadSeeder;

impl CellSeeder for DeadSeeder {
    fn is_alive(&mut self, _row: usize, _col: usize) -> bool {
        false
    }
}

/// Seeder that makes each cell alive independently with a fixed probability.
#[derive(Debug, Clone)]
pub struct RandomSeeder {
    rng: StdRng,
    distribution: Bernoulli,
}

impl RandomSeeder {
    /// Create a seeder. With `seed = Some(_)` the produced grids are
    /// reproducible; with `None` the generator is seeded from the OS.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::InvalidProbability`] if `probability` is not in
    /// `[0, 1]`.
    pub fn new(probability: f64, seed: Option<u64>) -> Result<Self, SeedError> {
        let distribution = Bernoulli::new(probability)
            .map_err(|_err| SeedError::InvalidProbability { probability })?;
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Ok(Self { rng, distribution })
    }
}

impl CellSeeder for RandomSeeder {
    fn is_alive(&mut self, _row: usize, _col: usize) -> bool {
        self.distribution.sample(&mut self.rng)
    }
}
