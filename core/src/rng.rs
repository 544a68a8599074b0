//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! Stochastic runs derive every stream from a caller-supplied seed,
//! so the same seed always reproduces the same season.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A seeded RNG stream for one stochastic run.
pub struct SeasonRng {
    inner: Pcg64Mcg,
}

impl SeasonRng {
    /// Create the RNG for `stream` under `master_seed`. Distinct streams
    /// under one seed are independent and individually reproducible.
    pub fn new(master_seed: u64, stream: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(derive_seed(master_seed, stream)),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn derive_seed(master_seed: u64, stream: u64) -> u64 {
    master_seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15)
}
