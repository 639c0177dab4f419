use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::audio::domain::signal::Signal;
use crate::audio::domain::transform::{ensure_valid, Transform, TransformError};

pub const DEFAULT_NOISE_LEVEL: f32 = 0.005;

/// Adds zero-mean white Gaussian noise scaled by `noise_level`.
///
/// Draws a fresh value per sample from the supplied generator, so two calls
/// differ unless the caller reseeds it.
#[derive(Clone, Copy, Debug)]
pub struct AddNoise {
    noise_level: f32,
}

impl AddNoise {
    pub fn new(noise_level: f32) -> Result<Self, TransformError> {
        if !noise_level.is_finite() || noise_level < 0.0 {
            return Err(TransformError::InvalidParameter {
                transform: "add_noise",
                name: "noise_level",
                value: noise_level as f64,
                reason: "must be finite and non-negative",
            });
        }
        Ok(Self { noise_level })
    }

    pub fn noise_level(&self) -> f32 {
        self.noise_level
    }
}

impl Transform for AddNoise {
    fn name(&self) -> &str {
        "add_noise"
    }

    fn apply(&self, signal: &Signal, rng: &mut dyn RngCore) -> Result<Signal, TransformError> {
        ensure_valid(self.name(), signal)?;

        let level = self.noise_level;
        Ok(signal.map_samples(|s| {
            let z: f32 = StandardNormal.sample(&mut *rng);
            s + z * level
        }))
    }
}
