use std::path::Path;

use crate::audio::domain::signal::Signal;

/// Domain interface for decoding an audio file into a [`Signal`].
pub trait AudioDecoder: Send + Sync {
    /// Decodes `path` and resamples to `target_sample_rate` when the native
    /// rate differs. With `mono` set, channels are averaged into one.
    fn decode(
        &self,
        path: &Path,
        target_sample_rate: u32,
        mono: bool,
    ) -> Result<Signal, Box<dyn std::error::Error>>;
}
