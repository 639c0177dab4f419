use ndarray::{s, ArrayView1};
use rand::RngCore;

use crate::audio::domain::signal::Signal;
use crate::audio::domain::transform::{ensure_valid, Transform, TransformError};

pub const DEFAULT_TOP_DB: f32 = 20.0;

/// RMS analysis frame length in samples.
const FRAME_LENGTH: usize = 2048;

/// Hop between successive RMS frames.
const HOP_LENGTH: usize = 512;

/// Floor applied to mean-square energy before taking the logarithm.
const ENERGY_FLOOR: f64 = 1e-10;

/// Trims leading and trailing silence.
///
/// A frame counts as silent when its RMS energy is more than `top_db`
/// decibels below the loudest frame. The output keeps everything from the
/// first to the last non-silent frame.
#[derive(Clone, Copy, Debug)]
pub struct SilenceTrim {
    top_db: f32,
}

impl SilenceTrim {
    pub fn new(top_db: f32) -> Result<Self, TransformError> {
        if !top_db.is_finite() || top_db <= 0.0 {
            return Err(TransformError::InvalidParameter {
                transform: "silence_trim",
                name: "top_db",
                value: top_db as f64,
                reason: "must be finite and positive",
            });
        }
        Ok(Self { top_db })
    }

    pub fn top_db(&self) -> f32 {
        self.top_db
    }

    /// Returns the `[start, end)` sample range that survives trimming.
    pub fn trim_bounds(&self, signal: &Signal) -> (usize, usize) {
        let n = signal.len();
        let per_channel: Vec<Vec<f64>> = signal
            .data()
            .rows()
            .into_iter()
            .map(frame_energy)
            .collect();

        // Loudest channel per frame; the reference is the loudest frame overall.
        let frame_count = 1 + n / HOP_LENGTH;
        let energy: Vec<f64> = (0..frame_count)
            .map(|f| per_channel.iter().map(|ch| ch[f]).fold(0.0f64, f64::max))
            .collect();
        let reference = energy.iter().cloned().fold(0.0f64, f64::max);
        let reference_db = to_db(reference);
        let threshold = -(self.top_db as f64);
        let non_silent = |f: &usize| to_db(energy[*f]) - reference_db > threshold;

        let first = (0..frame_count).find(non_silent);
        let last = (0..frame_count).rev().find(non_silent);
        match (first, last) {
            (Some(first), Some(last)) => {
                let start = (first * HOP_LENGTH).min(n);
                let end = ((last + 1) * HOP_LENGTH).min(n);
                (start, end)
            }
            _ => (0, 0),
        }
    }
}

impl Default for SilenceTrim {
    fn default() -> Self {
        Self {
            top_db: DEFAULT_TOP_DB,
        }
    }
}

impl Transform for SilenceTrim {
    fn name(&self) -> &str {
        "silence_trim"
    }

    fn apply(&self, signal: &Signal, _rng: &mut dyn RngCore) -> Result<Signal, TransformError> {
        ensure_valid(self.name(), signal)?;

        let (start, end) = self.trim_bounds(signal);
        log::debug!(
            "silence_trim: keeping samples {start}..{end} of {}",
            signal.len()
        );
        Ok(Signal::new(
            signal.data().slice(s![.., start..end]).to_owned(),
            signal.sample_rate(),
        ))
    }
}

/// Mean-square energy per frame.
///
/// Frames are centred on `t * HOP_LENGTH` with zero padding at both ends.
fn frame_energy(samples: ArrayView1<'_, f32>) -> Vec<f64> {
    let n = samples.len();
    let pad = (FRAME_LENGTH / 2) as isize;
    let frame_count = 1 + n / HOP_LENGTH;

    (0..frame_count)
        .map(|frame| {
            let start = (frame * HOP_LENGTH) as isize - pad;
            let lo = start.max(0) as usize;
            let hi = ((start + FRAME_LENGTH as isize).max(0) as usize).min(n);
            let energy: f64 = if lo < hi {
                samples
                    .slice(s![lo..hi])
                    .iter()
                    .map(|&x| (x as f64) * (x as f64))
                    .sum()
            } else {
                0.0
            };
            energy / FRAME_LENGTH as f64
        })
        .collect()
}

fn to_db(energy: f64) -> f64 {
    10.0 * energy.max(ENERGY_FLOOR).log10()
}
