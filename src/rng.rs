//! # Random Sources
//!
//! Every selector and alterer receives its randomness explicitly as a
//! `&mut dyn RandomSource`. There is no ambient global generator: the driver
//! owns one master [`RandomNumberGenerator`] and the concurrency scope hands
//! each task its own generator, seeded from the scope seed and the task's
//! stream index.
//!
//! ## Example
//!
//! ```rust
//! use generational_ga::rng::{RandomNumberGenerator, RandomSource};
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let index = rng.next_int(10);
//! let u = rng.next_double();
//!
//! assert!(index < 10);
//! assert!((0.0..1.0).contains(&u));
//! ```

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Uniform randomness as consumed by the engine.
///
/// Any `rand::RngCore` is a `RandomSource`, so all of `rand`'s adaptors
/// (`gen_range`, `seq::index::sample`, ...) also work on
/// `&mut dyn RandomSource`.
pub trait RandomSource: RngCore {
    /// Returns a uniformly distributed index in `[0, bound)`.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    fn next_int(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }

    /// Returns a uniformly distributed value in `[0, 1)`.
    fn next_double(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl<R: RngCore> RandomSource for R {}

/// Golden-ratio increment used to spread stream indices over the seed space.
const STREAM_INCREMENT: u64 = 0x9E37_79B9_7F4A_7C15;

/// A wrapper around the `rand` crate's `StdRng`.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates the generator for stream `stream` of the global seed `seed`.
    ///
    /// Distinct streams of the same seed produce independent sequences, and
    /// the same `(seed, stream)` pair always produces the same sequence.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mixed = seed ^ stream.wrapping_add(1).wrapping_mul(STREAM_INCREMENT);
        Self::from_seed(mixed)
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for RandomNumberGenerator {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Draws `k` distinct indices from `[0, n)`, returned in ascending order.
///
/// `k` is clamped to `n`.
pub fn subset(rng: &mut dyn RandomSource, n: usize, k: usize) -> Vec<usize> {
    let k = k.min(n);
    if k == 0 {
        return Vec::new();
    }
    let mut indices = rand::seq::index::sample(rng, n, k).into_vec();
    indices.sort_unstable();
    indices
}
