//! Deterministic random number generation for the price walk.
//!
//! RULE: the walk never calls a platform RNG directly. Every delta flows
//! through a [`WalkRng`] seeded once at startup, so a fixed seed reproduces
//! the entire walk.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

pub struct WalkRng {
    inner: Pcg64Mcg,
}

impl WalkRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [from, to).
    pub fn range(&mut self, from: f64, to: f64) -> f64 {
        from + self.next_f64() * (to - from)
    }
}
