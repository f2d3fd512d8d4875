//! Seedable random source shared by every sampler in the engine

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source injected into the simulation.
///
/// A fixed seed reproduces the same particle stream exactly.
pub struct ParticleRng {
    inner: StdRng,
}

impl ParticleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns a float in [-1, 1)
    pub fn signed_unit(&mut self) -> f32 {
        self.range(-1.0, 1.0)
    }

    /// Standard normal sample (Box-Muller)
    pub fn normal(&mut self) -> f32 {
        // 1 - u keeps the logarithm argument in (0, 1]
        let u1 = 1.0 - self.next_f32();
        let u2 = self.next_f32();
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }

    /// Returns an integer in [0, n). `n` must be non-zero.
    pub fn below(&mut self, n: usize) -> usize {
        self.inner.random_range(0..n)
    }

    /// Fair coin flip
    pub fn coin(&mut self) -> bool {
        self.below(2) == 0
    }
}

impl Default for ParticleRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
