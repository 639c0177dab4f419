use rand::RngCore;

use super::resampler::resample_channels;
use super::stft::{stretch, Stft};
use crate::audio::domain::signal::Signal;
use crate::audio::domain::transform::{ensure_valid, Transform, TransformError};

/// Default pitch shift in semitones (upward).
pub const DEFAULT_SEMITONES: f32 = 2.0;

/// Shifts pitch by `n_steps` semitones without changing duration.
///
/// The signal is time-stretched by `2^(-n_steps / 12)` with the phase vocoder
/// and then resampled by the same factor, which restores the original
/// duration and moves every partial by the requested interval.
pub struct PitchShift {
    n_steps: f32,
    stft: Stft,
}

impl PitchShift {
    pub fn new(n_steps: f32) -> Result<Self, TransformError> {
        if !n_steps.is_finite() {
            return Err(TransformError::InvalidParameter {
                transform: "pitch_shift",
                name: "n_steps",
                value: n_steps as f64,
                reason: "must be finite",
            });
        }
        Ok(Self {
            n_steps,
            stft: Stft::new(),
        })
    }

    pub fn n_steps(&self) -> f32 {
        self.n_steps
    }

    fn shift_channel(&self, samples: Vec<f32>, rate: f64) -> Result<Vec<f32>, TransformError> {
        let n = samples.len();
        let stretched = stretch(&self.stft, &samples, rate);
        let mut shifted = resample_channels(&[stretched], rate)
            .map_err(|e| TransformError::Resample {
                transform: "pitch_shift",
                source: Box::new(e),
            })?
            .into_iter()
            .next()
            .unwrap_or_default();
        shifted.resize(n, 0.0);
        Ok(shifted)
    }
}

impl Default for PitchShift {
    fn default() -> Self {
        Self {
            n_steps: DEFAULT_SEMITONES,
            stft: Stft::new(),
        }
    }
}

impl Transform for PitchShift {
    fn name(&self) -> &str {
        "pitch_shift"
    }

    fn apply(&self, signal: &Signal, _rng: &mut dyn RngCore) -> Result<Signal, TransformError> {
        ensure_valid(self.name(), signal)?;

        if self.n_steps == 0.0 {
            return Ok(signal.clone());
        }

        let rate = 2.0_f64.powf(-(self.n_steps as f64) / 12.0);
        signal.map_channels(|channel| self.shift_channel(channel.to_vec(), rate))
    }
}
