//! Random sources for weather, orbit noise, and failure rolls
//!
//! Every stochastic decision in the simulation draws from a [`RandomSource`]
//! handed in by the caller, so runs can be seeded and tests can pin outcomes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the two draws the simulation needs
pub trait RandomSource: Send {
    /// Uniform integer in [0, 100)
    fn percent(&mut self) -> u32;

    /// Uniform float in [0, 1)
    fn unit(&mut self) -> f64;
}

/// `StdRng`-backed source, seeded for reproducible runs
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn percent(&mut self) -> u32 {
        self.rng.gen_range(0..100)
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Constant draws, for pinning outcomes in tests and demos
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRandom {
    pub percent: u32,
    pub unit: f64,
}

impl FixedRandom {
    pub fn new(percent: u32, unit: f64) -> Self {
        Self {
            percent: percent.min(99),
            unit: unit.clamp(0.0, 0.999_999),
        }
    }

    /// Clear weather, no random failures
    pub fn calm() -> Self {
        Self::new(99, 0.5)
    }

    /// Degraded weather and a failure on every roll
    pub fn hostile() -> Self {
        Self::new(0, 0.5)
    }
}

impl RandomSource for FixedRandom {
    fn percent(&mut self) -> u32 {
        self.percent
    }

    fn unit(&mut self) -> f64 {
        self.unit
    }
}
