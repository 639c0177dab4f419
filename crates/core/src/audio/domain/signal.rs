use ndarray::{Array1, Array2, ArrayView1, Axis};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("signal must have at least one channel")]
    NoChannels,
    #[error("channel {channel} has {actual} frames, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        actual: usize,
    },
}

/// Decoded audio: channel-major `f32` samples of shape `(channels, frames)`
/// plus the sample rate they were captured at.
///
/// Mono audio is a single row. Transforms never change the sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    data: Array2<f32>,
    sample_rate: u32,
}

impl Signal {
    pub fn new(data: Array2<f32>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            data: Array1::from(samples).insert_axis(Axis(0)),
            sample_rate,
        }
    }

    /// Builds a signal from per-channel sample vectors of equal length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, SignalError> {
        let expected = channels.first().ok_or(SignalError::NoChannels)?.len();
        if let Some((channel, samples)) = channels
            .iter()
            .enumerate()
            .find(|(_, samples)| samples.len() != expected)
        {
            return Err(SignalError::RaggedChannels {
                channel,
                expected,
                actual: samples.len(),
            });
        }

        let count = channels.len();
        let mut data = Array2::<f32>::zeros((count, expected));
        for (mut row, samples) in data.rows_mut().into_iter().zip(channels) {
            row.assign(&Array1::from(samples));
        }
        Ok(Self { data, sample_rate })
    }

    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn channel(&self, index: usize) -> ArrayView1<'_, f32> {
        self.data.row(index)
    }

    pub fn channels(&self) -> usize {
        self.data.nrows()
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample across all channels.
    pub fn peak(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|s| s.is_finite())
    }

    /// Averages all channels into a single one.
    pub fn to_mono(&self) -> Signal {
        if self.channels() <= 1 {
            return self.clone();
        }
        let count = self.channels() as f32;
        let mixed = self.data.sum_axis(Axis(0)).mapv(|s| s / count);
        Signal {
            data: mixed.insert_axis(Axis(0)),
            sample_rate: self.sample_rate,
        }
    }

    /// Returns a signal of the same shape with `f` applied to every sample.
    pub fn map_samples<F>(&self, f: F) -> Signal
    where
        F: FnMut(f32) -> f32,
    {
        Signal {
            data: self.data.mapv(f),
            sample_rate: self.sample_rate,
        }
    }

    /// Runs `f` over each channel and reassembles the results.
    ///
    /// Every channel output must have the same length.
    pub fn map_channels<F, E>(&self, mut f: F) -> Result<Signal, E>
    where
        F: FnMut(ArrayView1<'_, f32>) -> Result<Vec<f32>, E>,
        E: From<SignalError>,
    {
        let channels = self
            .data
            .rows()
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Signal::from_channels(channels, self.sample_rate)?)
    }
}
