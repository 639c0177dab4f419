use rand::RngCore;
use thiserror::Error;

use super::signal::{Signal, SignalError};

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{transform}: invalid signal: {reason}")]
    InvalidSignal {
        transform: String,
        reason: &'static str,
    },
    #[error("{transform}: invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        transform: &'static str,
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("{transform} changed sample rate from {expected} Hz to {actual} Hz")]
    SampleRateChanged {
        transform: String,
        expected: u32,
        actual: u32,
    },
    #[error("{transform}: resampling failed: {source}")]
    Resample {
        transform: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Shape(#[from] SignalError),
}

/// A single audio-to-audio operation with fixed parameters.
///
/// Implementations take the signal by reference and return a new one; the
/// input is never modified and the sample rate is preserved. Any randomness
/// is drawn from the caller-supplied generator.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, signal: &Signal, rng: &mut dyn RngCore) -> Result<Signal, TransformError>;
}

/// Rejects empty signals and signals containing NaN or infinity.
pub fn ensure_valid(transform: &str, signal: &Signal) -> Result<(), TransformError> {
    let reason = if signal.is_empty() {
        "signal is empty"
    } else if !signal.is_finite() {
        "signal contains NaN or infinite samples"
    } else {
        return Ok(());
    };
    Err(TransformError::InvalidSignal {
        transform: transform.to_string(),
        reason,
    })
}
