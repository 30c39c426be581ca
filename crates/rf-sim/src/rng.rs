//! Deterministic simulation RNG.
//!
//! Wraps `ChaCha8Rng` so identical seeds produce identical telemetry and
//! optimization output across platforms.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Seedable RNG shared by the simulator and the random optimization strategy.
#[derive(Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    /// Create a new `SimRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Seed from OS entropy, for sessions that want fresh telemetry each run.
    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// Uniform sample in `[-amplitude, +amplitude]`.
    ///
    /// The amplitude is capped at `f64::MAX / 2` so the band width stays finite.
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        if amplitude.is_nan() || amplitude <= 0.0 {
            return 0.0;
        }
        let amplitude = amplitude.min(f64::MAX / 2.0);
        self.0.gen_range(-amplitude..=amplitude)
    }

    /// Uniform integer in `[low, high]`.
    pub fn int_between(&mut self, low: u32, high: u32) -> u32 {
        self.0.gen_range(low..=high)
    }
}
