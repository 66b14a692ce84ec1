//! Per-frame render context.
//!
//! Holds the state that would otherwise be ambient: the frame clock,
//! the slowly advancing noise offset, the frame-seeded random generator
//! and the coherent-noise source used for canopy sway.

use noise::{NoiseFn, Perlin};
use rand::{SeedableRng, rngs::StdRng};

/// Smooth 2-D noise in `[0, 1]`.
pub trait NoiseSource {
    fn sample(&self, x: f64, y: f64) -> f64;
}

/// Perlin noise rescaled from `[-1, 1]` into `[0, 1]`.
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl NoiseSource for PerlinNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        (self.perlin.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Clock, noise offset and seeded randomness for one frame.
pub struct FrameContext {
    now_ms: f64,
    noise_offset: f64,
    noise_rate: f64,
    seed: u64,
    /// Reset to `seed` by every [`FrameContext::begin_frame`].
    pub rng: StdRng,
    noise: Box<dyn NoiseSource>,
}

impl FrameContext {
    pub fn new(seed: u64, noise_rate: f64, noise: Box<dyn NoiseSource>) -> Self {
        Self {
            now_ms: 0.0,
            noise_offset: 0.0,
            noise_rate,
            seed,
            rng: StdRng::seed_from_u64(seed),
            noise,
        }
    }

    /// Context backed by Perlin noise seeded from the frame seed.
    pub fn with_perlin(seed: u64, noise_rate: f64) -> Self {
        Self::new(seed, noise_rate, Box::new(PerlinNoise::new(seed as u32)))
    }

    /// Starts a frame at `now_ms`.
    ///
    /// Advances the noise offset by one step and reseeds the frame
    /// generator. The clock never runs backwards; an earlier `now_ms`
    /// keeps the previous time.
    pub fn begin_frame(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
        self.noise_offset += self.noise_rate;
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[inline]
    pub fn noise_offset(&self) -> f64 {
        self.noise_offset
    }

    /// Noise at `(x, current noise offset)`.
    #[inline]
    pub fn sway(&self, x: f64) -> f64 {
        self.noise.sample(x, self.noise_offset)
    }
}

impl std::fmt::Debug for FrameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameContext")
            .field("now_ms", &self.now_ms)
            .field("noise_offset", &self.noise_offset)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Noise that always returns the same value.
#[cfg(test)]
#[derive(Clone, Copy, Debug)]
pub struct ConstNoise(pub f64);

#[cfg(test)]
impl NoiseSource for ConstNoise {
    fn sample(&self, _x: f64, _y: f64) -> f64 {
        self.0
    }
}
