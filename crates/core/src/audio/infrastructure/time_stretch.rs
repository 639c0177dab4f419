use rand::RngCore;

use super::stft::{stretch, Stft};
use crate::audio::domain::signal::Signal;
use crate::audio::domain::transform::{ensure_valid, Transform, TransformError};

pub const DEFAULT_RATE: f32 = 1.0;

/// Phase vocoder time stretch.
///
/// `rate > 1` shortens the signal, `rate < 1` lengthens it; pitch is kept.
/// Each channel is stretched independently to `round(len / rate)` frames.
pub struct TimeStretch {
    rate: f32,
    stft: Stft,
}

impl TimeStretch {
    pub fn new(rate: f32) -> Result<Self, TransformError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(TransformError::InvalidParameter {
                transform: "time_stretch",
                name: "rate",
                value: rate as f64,
                reason: "must be finite and positive",
            });
        }
        Ok(Self {
            rate,
            stft: Stft::new(),
        })
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }
}

impl Default for TimeStretch {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            stft: Stft::new(),
        }
    }
}

impl Transform for TimeStretch {
    fn name(&self) -> &str {
        "time_stretch"
    }

    fn apply(&self, signal: &Signal, _rng: &mut dyn RngCore) -> Result<Signal, TransformError> {
        ensure_valid(self.name(), signal)?;

        let rate = self.rate as f64;
        signal.map_channels(|channel| {
            Ok::<_, TransformError>(stretch(&self.stft, &channel.to_vec(), rate))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;
    use std::f64::consts::PI;

    fn sine(freq: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / 16000.0).sin() as f32 * 0.5)
            .collect()
    }

    fn apply(stretcher: &TimeStretch, signal: &Signal) -> Signal {
        stretcher
            .apply(signal, &mut StdRng::seed_from_u64(0))
            .unwrap()
    }

    #[rstest]
    #[case::faster(1.05, 15238)]
    #[case::slower(0.8, 20000)]
    #[case::double(2.0, 8000)]
    #[case::unit(1.0, 16000)]
    fn test_output_length(#[case] rate: f32, #[case] expected: usize) {
        let signal = Signal::mono(sine(440.0, 16000), 16000);
        let out = apply(&TimeStretch::new(rate).unwrap(), &signal);
        assert_eq!(out.len(), expected);
        assert_eq!(out.sample_rate(), 16000);
    }

    #[test]
    fn test_preserves_pitch() {
        let signal = Signal::mono(sine(440.0, 16000), 16000);
        let out = apply(&TimeStretch::new(0.5).unwrap(), &signal);

        // Zero crossings per second stay near 2 * 440.
        let body = &out.channel(0).to_vec()[4000..28000];
        let crossings = body
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count();
        let per_second = crossings as f64 / (body.len() as f64 / 16000.0);
        assert!(
            (per_second - 880.0).abs() < 40.0,
            "crossings per second={per_second}"
        );
    }

    #[test]
    fn test_stretches_each_channel() {
        let signal =
            Signal::from_channels(vec![sine(440.0, 8000), sine(220.0, 8000)], 16000).unwrap();
        let out = apply(&TimeStretch::new(1.25).unwrap(), &signal);
        assert_eq!(out.channels(), 2);
        assert_eq!(out.len(), 6400);
    }

    #[test]
    fn test_default_rate_is_unity() {
        assert_eq!(TimeStretch::default().rate(), DEFAULT_RATE);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f32::NAN)]
    fn test_rejects_invalid_rate(#[case] rate: f32) {
        assert!(matches!(
            TimeStretch::new(rate),
            Err(TransformError::InvalidParameter { name: "rate", .. })
        ));
    }

    #[test]
    fn test_rejects_empty_signal() {
        let result = TimeStretch::default()
            .apply(&Signal::mono(vec![], 16000), &mut StdRng::seed_from_u64(0));
        assert!(result.is_err());
    }
}
