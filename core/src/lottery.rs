//! Weighted index sampling shared by every randomized selection.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Reasons a weighted draw could not be performed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LotteryError {
    /// The weights summed to zero, so no index can be selected.
    #[error("degenerate distribution: {len} weights sum to zero")]
    DegenerateDistribution {
        /// Number of weights supplied to the draw.
        len: usize,
    },
}

/// Samples indices with probability proportional to their weight.
///
/// The random source is injected so that tests and replays can drive the
/// lottery deterministically.
#[derive(Clone, Debug)]
pub struct WeightedLottery<R = ChaCha8Rng> {
    rng: R,
}

impl WeightedLottery<ChaCha8Rng> {
    /// Creates a lottery backed by a ChaCha stream seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> WeightedLottery<R> {
    /// Wraps the provided random source.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws an index from `weights`.
    pub fn sample(&mut self, weights: &[u32]) -> Result<usize, LotteryError> {
        sample_index(&mut self.rng, weights)
    }
}

/// Draws an index from `weights` using `rng`.
///
/// A uniform integer `r` in `[0, sum)` is drawn and the weights are walked in
/// order; the first index whose cumulative span contains `r` wins. Zero
/// weights are never selected.
pub fn sample_index<R: Rng + ?Sized>(rng: &mut R, weights: &[u32]) -> Result<usize, LotteryError> {
    let degenerate = LotteryError::DegenerateDistribution { len: weights.len() };
    let total: u64 = weights.iter().map(|weight| u64::from(*weight)).sum();
    if total == 0 {
        return Err(degenerate);
    }

    let mut remaining = rng.gen_range(0..total);
    weights
        .iter()
        .position(|weight| {
            let weight = u64::from(*weight);
            if remaining < weight {
                true
            } else {
                remaining -= weight;
                false
            }
        })
        .ok_or(degenerate)
}
