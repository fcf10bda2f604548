//! ---
//! cb_section: "02-simulation"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Injectable random sources for reproducible simulation runs."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws used by the simulator and bench helpers.
pub trait RandomSource {
    /// Uniform sample in the inclusive range `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform integer in the inclusive range `[low, high]`.
    fn uniform_u32(&mut self, low: u32, high: u32) -> u32 {
        let sample = self.uniform(f64::from(low), f64::from(high)).round();
        (sample as u32).clamp(low.min(high), high.max(low))
    }
}

/// Seedable generator backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededSource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn uniform_u32(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Deterministic source that always answers the middle of the range.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointSource;

impl RandomSource for MidpointSource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (low + high) / 2.0
    }
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (**self).uniform(low, high)
    }

    fn uniform_u32(&mut self, low: u32, high: u32) -> u32 {
        (**self).uniform_u32(low, high)
    }
}
