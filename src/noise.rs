// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Noise Sources

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform samples in `[0, 1)` feeding the drift noise terms.
pub trait NoiseSource {
    fn next_unit(&mut self) -> f64;

    /// Zero-mean sample in `[-amplitude/2, amplitude/2)`.
    fn centered(&mut self, amplitude: f64) -> f64 {
        (self.next_unit() - 0.5) * amplitude
    }
}

/// Seeded ChaCha stream. Identical seeds replay identical drift.
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: ChaCha8Rng,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl NoiseSource for SeededNoise {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Constant sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl FixedNoise {
    /// Always 0.5, which removes the random term from drift entirely.
    pub fn neutral() -> Self {
        Self(0.5)
    }
}

impl NoiseSource for FixedNoise {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}
