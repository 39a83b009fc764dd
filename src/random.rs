// randomness used by measurement
//
// the simulator owns the source it is constructed with; there is no global rng.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Supplies uniform draws in `[0, 1)`, consumed in program order.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Seeded pseudo random stream. The same seed gives the same outcomes.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeded once from the wall clock, like a process start.
    pub fn from_time() -> Self {
        Self::new(time_seed())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>() // gen::<f64>() is uniform in [0, 1)
    }
}

/// Replays a fixed list of draws.
///
/// Once the list is exhausted every further draw is 0.0 (and logged), which
/// always selects the zero outcome of a measurement with non-zero probability.
#[derive(Debug, Clone, Default)]
pub struct FixedSequence {
    draws: VecDeque<f64>,
}

impl FixedSequence {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        FixedSequence {
            draws: draws.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for FixedSequence {
    fn next_f64(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or_else(|| {
            warn!("fixed random sequence exhausted, drawing 0.0");
            0.0
        })
    }
}

/// Seconds since the unix epoch. A clock before 1970 seeds with 0.
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
