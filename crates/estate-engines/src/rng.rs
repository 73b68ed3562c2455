//! Injectable randomness.
//!
//! Engines draw every random number through [`SimRng`]. Production code
//! passes a seeded `rand` generator (any [`RngCore`] implements the trait);
//! tests that need an exact sequence pass a [`ScriptedRng`].

use rand::{Rng, RngCore};

/// Source of uniform random numbers for the simulation.
pub trait SimRng {
    /// A uniform sample in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// A uniform index in `0..len`. Returns 0 when `len` is 0.
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let scaled = (self.next_f64() * len as f64).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = scaled as usize;
        index.min(len.saturating_sub(1))
    }

    /// `true` with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// A uniform sample in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }
}

impl<R: RngCore> SimRng for R {
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.random_range(0..len)
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
///
/// An empty script always yields 0.0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    /// Create a generator replaying `samples` (each clamped into `[0, 1)`).
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples
                .into_iter()
                .map(|s| s.clamp(0.0, 1.0 - f64::EPSILON))
                .collect(),
            cursor: 0,
        }
    }

    /// A generator that always yields `value`.
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    /// Number of samples drawn so far.
    pub const fn draws(&self) -> usize {
        self.cursor
    }
}

impl SimRng for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let index = self.cursor % self.samples.len();
        self.cursor = self.cursor.saturating_add(1);
        self.samples.get(index).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn scripted_rng_cycles() {
        let mut rng = ScriptedRng::new([0.1, 0.9]);
        assert!((rng.next_f64() - 0.1).abs() < 1e-12);
        assert!((rng.next_f64() - 0.9).abs() < 1e-12);
        assert!((rng.next_f64() - 0.1).abs() < 1e-12);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn scripted_chance_and_index() {
        let mut rng = ScriptedRng::constant(0.5);
        assert!(rng.chance(0.6));
        assert!(!rng.chance(0.4));
        assert_eq!(rng.next_index(4), 2);
        assert_eq!(rng.next_index(0), 0);
        assert!((rng.uniform(10.0, 20.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        for _ in 0..10 {
            assert!((SimRng::next_f64(&mut a) - SimRng::next_f64(&mut b)).abs() < f64::EPSILON);
        }
        let index = SimRng::next_index(&mut a, 3);
        assert!(index < 3);
    }

    #[test]
    fn works_through_trait_object() {
        let mut seeded = SmallRng::seed_from_u64(1);
        let rng: &mut dyn SimRng = &mut seeded;
        let sample = rng.uniform(-0.02, 0.02);
        assert!((-0.02..0.02).contains(&sample));
    }
}
