use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use thiserror::Error;

use crate::audio::domain::signal::{Signal, SignalError};

#[derive(Error, Debug)]
pub enum ResamplingError {
    #[error("invalid resampling ratio {0}")]
    InvalidRatio(f64),
    #[error("failed to build resampler: {0}")]
    Construction(#[from] rubato::ResamplerConstructionError),
    #[error("resampling failed: {0}")]
    Process(#[from] rubato::ResampleError),
    #[error(transparent)]
    Shape(#[from] SignalError),
}

fn interpolation_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Resamples equal-length channels by `ratio` (output rate / input rate).
///
/// The resampler's group delay is removed so output sample `i` lines up with
/// input time `i / ratio`. Each output channel has `round(len * ratio)`
/// samples.
pub fn resample_channels(
    channels: &[Vec<f32>],
    ratio: f64,
) -> Result<Vec<Vec<f32>>, ResamplingError> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(ResamplingError::InvalidRatio(ratio));
    }

    let frames = channels.first().map_or(0, Vec::len);
    if frames == 0 || (ratio - 1.0).abs() < 1e-12 {
        return Ok(channels.to_vec());
    }

    let expected = (frames as f64 * ratio).round() as usize;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        1.0,
        interpolation_parameters(),
        frames,
        channels.len(),
    )?;
    let delay = resampler.output_delay();
    let needed = delay + expected;

    let mut output = resampler.process(channels, None)?;
    // Each zero-input flush yields about one chunk of output; short inputs
    // need many of them to get past the group delay.
    let max_flushes = needed / resampler.output_frames_next().max(1) + 2;
    for _ in 0..max_flushes {
        if output[0].len() >= needed {
            break;
        }
        let tail = resampler.process_partial(None::<&[Vec<f32>]>, None)?;
        for (out, rest) in output.iter_mut().zip(tail) {
            out.extend(rest);
        }
    }

    Ok(output
        .into_iter()
        .map(|channel| {
            let mut aligned: Vec<f32> = channel.into_iter().skip(delay).take(expected).collect();
            aligned.resize(expected, 0.0);
            aligned
        })
        .collect())
}

/// Resamples a signal to `target_rate`.
pub fn resample(signal: &Signal, target_rate: u32) -> Result<Signal, ResamplingError> {
    if signal.sample_rate() == target_rate {
        return Ok(signal.clone());
    }
    log::debug!(
        "Resampling {} frames from {} Hz to {} Hz",
        signal.len(),
        signal.sample_rate(),
        target_rate
    );
    let ratio = target_rate as f64 / signal.sample_rate() as f64;
    let channels: Vec<Vec<f32>> = signal.data().rows().into_iter().map(|r| r.to_vec()).collect();
    let resampled = resample_channels(&channels, ratio)?;
    Ok(Signal::from_channels(resampled, target_rate)?)
}
