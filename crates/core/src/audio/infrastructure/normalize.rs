use rand::RngCore;

use crate::audio::domain::signal::Signal;
use crate::audio::domain::transform::{ensure_valid, Transform, TransformError};

/// Peak normalization: rescales so the largest absolute sample is 1.0.
///
/// A silent signal (peak exactly zero) is returned unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalize;

impl Normalize {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for Normalize {
    fn name(&self) -> &str {
        "normalize"
    }

    fn apply(&self, signal: &Signal, _rng: &mut dyn RngCore) -> Result<Signal, TransformError> {
        ensure_valid(self.name(), signal)?;

        let peak = signal.peak();
        if peak == 0.0 {
            return Ok(signal.clone());
        }
        Ok(signal.map_samples(|s| s / peak))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[rstest]
    #[case::quiet(vec![0.1, -0.05, 0.02])]
    #[case::loud(vec![3.0, -7.5, 2.0])]
    #[case::negative_peak(vec![-0.4, 0.1])]
    #[case::single_sample(vec![0.25])]
    fn test_peak_becomes_one(#[case] samples: Vec<f32>) {
        let out = Normalize::new()
            .apply(&Signal::mono(samples, 16000), &mut rng())
            .unwrap();
        assert_relative_eq!(out.peak(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_preserves_relative_shape() {
        let out = Normalize::new()
            .apply(&Signal::mono(vec![0.5, -0.25, 0.125], 16000), &mut rng())
            .unwrap();
        assert_eq!(out.channel(0).to_vec(), vec![1.0, -0.5, 0.25]);
    }

    #[test]
    fn test_silent_signal_unchanged() {
        let silent = Signal::mono(vec![0.0; 1024], 16000);
        let out = Normalize::new().apply(&silent, &mut rng()).unwrap();
        assert_eq!(out, silent);
        assert!(out.is_finite());
    }

    #[test]
    fn test_multichannel_uses_global_peak() {
        let signal = Signal::from_channels(vec![vec![0.2, 0.1], vec![-0.4, 0.3]], 8000).unwrap();
        let out = Normalize::new().apply(&signal, &mut rng()).unwrap();
        assert_relative_eq!(out.channel(0)[0], 0.5);
        assert_relative_eq!(out.channel(1)[0], -1.0);
    }

    #[test]
    fn test_preserves_sample_rate() {
        let out = Normalize::new()
            .apply(&Signal::mono(vec![0.3], 22050), &mut rng())
            .unwrap();
        assert_eq!(out.sample_rate(), 22050);
    }

    #[test]
    fn test_input_is_not_modified() {
        let signal = Signal::mono(vec![0.5, 0.25], 8000);
        let before = signal.clone();
        Normalize::new().apply(&signal, &mut rng()).unwrap();
        assert_eq!(signal, before);
    }

    #[test]
    fn test_rejects_nan() {
        let result = Normalize::new().apply(&Signal::mono(vec![f32::NAN], 8000), &mut rng());
        assert!(matches!(result, Err(TransformError::InvalidSignal { .. })));
    }

    #[test]
    fn test_rejects_empty() {
        let result = Normalize::new().apply(&Signal::mono(vec![], 8000), &mut rng());
        assert!(result.is_err());
    }
}
