//! Random helpers used while building particle batches.
//!
//! Effect builders draw every random quantity (speeds, sizes, lifetimes,
//! colors, launch angles) through an [`EmitContext`], so the distributions
//! read as ranges at the call site:
//!
//! ```ignore
//! let speed = ctx.random_range(2.0, 6.0) * power;
//! let color = ctx.pick(&colors);
//! ```

use crate::color::Color;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// RNG-backed sampling helpers for effect emission.
///
/// Output is intentionally not reproducible across runs; use
/// [`EmitContext::with_seed`] when a test needs a fixed sequence.
pub struct EmitContext {
    rng: SmallRng,
}

impl EmitContext {
    /// Context seeded from the system clock.
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`; returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random value in `[center - spread, center + spread)`.
    #[inline]
    pub fn jitter(&mut self, center: f32, spread: f32) -> f32 {
        self.random_range(center - spread, center + spread)
    }

    /// Random index below `len`; `len` must be non-zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    // ========== Angles ==========

    /// Uniform angle in `[0, 2π)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.random_range(0.0, TAU)
    }

    /// Evenly spaced angle for slot `index` of `count`, plus jitter.
    pub fn ring_angle(&mut self, index: u32, count: u32, jitter: f32) -> f32 {
        let base = if count == 0 {
            0.0
        } else {
            index as f32 / count as f32 * TAU
        };
        base + self.random_range(-jitter, jitter)
    }

    // ========== Colors ==========

    /// Uniformly pick one color.
    ///
    /// `colors` must not be empty; callers default their palettes before
    /// emitting. An empty slice yields white rather than panicking.
    pub fn pick(&mut self, colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::WHITE;
        }
        colors[self.random_index(colors.len())]
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}
