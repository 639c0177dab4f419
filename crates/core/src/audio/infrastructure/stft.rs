use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// STFT analysis/synthesis window size.
pub const WINDOW_SIZE: usize = 2048;

/// Hop size between successive STFT frames.
pub const HOP_SIZE: usize = 512;

/// Fraction of the peak overlap-add window energy below which output
/// samples are considered unreliable and zeroed.
const WINDOW_SUM_FLOOR: f64 = 0.1;

/// Short-time Fourier transform with a periodic Hann window and centred
/// frames (the signal is zero padded by half a window on both sides).
pub struct Stft {
    window: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Stft {
    pub fn new() -> Self {
        let window = (0..WINDOW_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / WINDOW_SIZE as f64).cos()))
            .collect();
        let mut planner = FftPlanner::<f64>::new();
        Self {
            window,
            forward: planner.plan_fft_forward(WINDOW_SIZE),
            inverse: planner.plan_fft_inverse(WINDOW_SIZE),
        }
    }

    /// Returns one half-spectrum (`WINDOW_SIZE / 2 + 1` bins) per frame.
    pub fn analyze(&self, samples: &[f32]) -> Vec<Vec<Complex<f64>>> {
        let pad = WINDOW_SIZE / 2;
        let mut padded = vec![0.0f64; samples.len() + 2 * pad];
        for (dst, &src) in padded[pad..].iter_mut().zip(samples) {
            *dst = src as f64;
        }

        let half = WINDOW_SIZE / 2 + 1;
        let frame_count = 1 + samples.len() / HOP_SIZE;
        (0..frame_count)
            .map(|frame| {
                let start = frame * HOP_SIZE;
                let mut buf: Vec<Complex<f64>> = (0..WINDOW_SIZE)
                    .map(|i| Complex::new(padded[start + i] * self.window[i], 0.0))
                    .collect();
                self.forward.process(&mut buf);
                buf.truncate(half);
                buf
            })
            .collect()
    }

    /// Inverse STFT by windowed overlap-add, trimmed to `length` samples.
    pub fn synthesize(&self, frames: &[Vec<Complex<f64>>], length: usize) -> Vec<f32> {
        if frames.is_empty() {
            return vec![0.0; length];
        }

        let half = WINDOW_SIZE / 2 + 1;
        let total = WINDOW_SIZE + HOP_SIZE * (frames.len() - 1);
        let mut output = vec![0.0f64; total];
        let mut window_sum = vec![0.0f64; total];
        // rustfft does not normalize
        let norm = 1.0 / WINDOW_SIZE as f64;

        for (frame_idx, spectrum) in frames.iter().enumerate() {
            let mut buf = vec![Complex::new(0.0, 0.0); WINDOW_SIZE];
            buf[..half].copy_from_slice(&spectrum[..half]);
            // Mirror for negative frequencies (conjugate symmetry for real output)
            for k in 1..half - 1 {
                buf[WINDOW_SIZE - k] = buf[k].conj();
            }
            self.inverse.process(&mut buf);

            let start = frame_idx * HOP_SIZE;
            for i in 0..WINDOW_SIZE {
                output[start + i] += buf[i].re * norm * self.window[i];
                window_sum[start + i] += self.window[i] * self.window[i];
            }
        }

        let max_window_sum = window_sum.iter().cloned().fold(0.0f64, f64::max);
        let threshold = max_window_sum * WINDOW_SUM_FLOOR;
        for (sample, &sum) in output.iter_mut().zip(&window_sum) {
            if sum >= threshold {
                *sample /= sum;
            } else {
                *sample = 0.0;
            }
        }

        let pad = WINDOW_SIZE / 2;
        let mut trimmed: Vec<f32> = output
            .iter()
            .skip(pad)
            .take(length)
            .map(|&s| s as f32)
            .collect();
        trimmed.resize(length, 0.0);
        trimmed
    }
}

impl Default for Stft {
    fn default() -> Self {
        Self::new()
    }
}

/// Phase vocoder: resamples STFT frames in time by `rate` while keeping
/// each bin's instantaneous frequency.
///
/// `rate > 1` yields fewer frames (faster), `rate < 1` more (slower).
pub fn phase_vocoder(frames: &[Vec<Complex<f64>>], rate: f64) -> Vec<Vec<Complex<f64>>> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let bins = first.len();
    let zero = vec![Complex::new(0.0, 0.0); bins];

    // Expected phase advance per hop for each bin.
    let phase_advance: Vec<f64> = (0..bins)
        .map(|k| 2.0 * PI * k as f64 * HOP_SIZE as f64 / WINDOW_SIZE as f64)
        .collect();
    let mut phase_acc: Vec<f64> = first.iter().map(|c| c.arg()).collect();

    let out_count = (frames.len() as f64 / rate).ceil() as usize;
    let mut stretched = Vec::with_capacity(out_count);

    for step_idx in 0..out_count {
        let step = step_idx as f64 * rate;
        if step >= frames.len() as f64 {
            break;
        }
        let idx = step.floor() as usize;
        let alpha = step - idx as f64;
        let left = &frames[idx];
        let right = frames.get(idx + 1).unwrap_or(&zero);

        let frame: Vec<Complex<f64>> = (0..bins)
            .map(|k| {
                let magnitude = (1.0 - alpha) * left[k].norm() + alpha * right[k].norm();
                Complex::from_polar(magnitude, phase_acc[k])
            })
            .collect();
        stretched.push(frame);

        for k in 0..bins {
            let delta = right[k].arg() - left[k].arg() - phase_advance[k];
            // Wrap to [-pi, pi]
            let wrapped = delta - 2.0 * PI * (delta / (2.0 * PI)).round();
            phase_acc[k] += phase_advance[k] + wrapped;
        }
    }

    stretched
}

/// Time-stretches `samples` by `rate` without changing pitch.
///
/// The output has `round(len / rate)` samples.
pub fn stretch(stft: &Stft, samples: &[f32], rate: f64) -> Vec<f32> {
    let target_len = (samples.len() as f64 / rate).round() as usize;
    let frames = stft.analyze(samples);
    let stretched = phase_vocoder(&frames, rate);
    stft.synthesize(&stretched, target_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, len: usize, sample_rate: f64) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin() as f32)
            .collect()
    }

    #[test]
    fn test_frame_count_is_centred() {
        let stft = Stft::new();
        let frames = stft.analyze(&vec![0.0; 16000]);
        assert_eq!(frames.len(), 1 + 16000 / HOP_SIZE);
        assert_eq!(frames[0].len(), WINDOW_SIZE / 2 + 1);
    }

    #[test]
    fn test_analysis_synthesis_round_trip() {
        let stft = Stft::new();
        let input = sine(440.0, 8000, 16000.0);
        let output = stft.synthesize(&stft.analyze(&input), input.len());
        let max_err = input
            .iter()
            .zip(&output)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 1e-4, "max_err={max_err}");
    }

    #[test]
    fn test_unit_rate_is_near_identity() {
        let stft = Stft::new();
        let input = sine(440.0, 8000, 16000.0);
        let output = stretch(&stft, &input, 1.0);
        assert_eq!(output.len(), input.len());
        let mse: f64 = input
            .iter()
            .zip(&output)
            .map(|(a, b)| ((a - b) as f64).powi(2))
            .sum::<f64>()
            / input.len() as f64;
        assert!(mse < 1e-6, "mse={mse}");
    }

    #[test]
    fn test_phase_vocoder_frame_count() {
        let stft = Stft::new();
        let frames = stft.analyze(&vec![0.0; 10240]);
        assert_eq!(phase_vocoder(&frames, 2.0).len(), (frames.len() as f64 / 2.0).ceil() as usize);
        assert_eq!(phase_vocoder(&frames, 0.5).len(), frames.len() * 2);
    }

    #[test]
    fn test_synthesize_pads_to_length() {
        let stft = Stft::new();
        let frames = stft.analyze(&[0.5; 100]);
        let out = stft.synthesize(&frames, 5000);
        assert_eq!(out.len(), 5000);
        assert!(out[4000..].iter().all(|&s| s == 0.0));
    }
}
