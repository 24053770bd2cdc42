//! Seeded random source shared by every layout decision.
//!
//! A calendar is reproducible from its seed alone, so every random choice
//! (label colors, label positions, cuckoo skips) is drawn from one
//! [`RandomStream`] owned by the pass that composes the document. The normal
//! and mirrored documents each construct their own stream from the same
//! seed; they never share one, so both replay the exact same sequence of
//! draws as long as they ask for them in the same order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic pseudo-random stream built from an integer seed.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: StdRng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform real in `[low, high]`.
    ///
    /// Equal bounds return `low` without consuming a draw; reversed bounds
    /// are swapped.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        if low == high {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    /// Pick one element uniformly. Returns `None` only for an empty slice.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..items.len());
        items.get(idx)
    }

    /// `true` with probability `p` (clamped to `[0, 1]`; NaN counts as 0).
    pub fn weighted_boolean(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.rng.random_bool(p)
    }
}
