//! Sampling gate: decides per record whether a rule fires at all.
//!
//! The only component in the crate that touches randomness; everything
//! downstream stays deterministic and testable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sampler for reproducible runs (`--seed`).
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fire with probability `rate`. Rates at or below 0 never fire and
    /// rates at or above 1 always fire, without consuming randomness.
    pub fn fire(&mut self, rate: f64) -> bool {
        if rate <= 0.0 {
            return false;
        }
        if rate >= 1.0 {
            return true;
        }
        self.rng.gen::<f64>() < rate
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}
