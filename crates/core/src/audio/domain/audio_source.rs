use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::signal::Signal;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::shared::constants::SUPPORTED_AUDIO_EXTENSIONS;

#[derive(Error, Debug)]
pub enum AudioSourceError {
    #[error("unsupported audio format {extension:?} for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}

enum LoadState {
    Unloaded,
    Loaded(Signal),
}

/// A single audio file, decoded lazily at a fixed target sample rate.
///
/// The first successful [`load`](Self::load) caches the signal; every later
/// call returns that same signal without touching the decoder.
pub struct AudioSource {
    path: PathBuf,
    sample_rate: u32,
    decoder: Arc<dyn AudioDecoder>,
    state: LoadState,
}

impl AudioSource {
    pub fn new(
        path: impl Into<PathBuf>,
        sample_rate: u32,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Result<Self, AudioSourceError> {
        let path = path.into();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AudioSourceError::UnsupportedFormat { path, extension });
        }
        Ok(Self {
            path,
            sample_rate,
            decoder,
            state: LoadState::Unloaded,
        })
    }

    /// Decodes the file on first use. `mono` only matters for that first call.
    pub fn load(&mut self, mono: bool) -> Result<&Signal, AudioSourceError> {
        match self.state {
            LoadState::Loaded(ref signal) => Ok(signal),
            LoadState::Unloaded => {
                let signal = self
                    .decoder
                    .decode(&self.path, self.sample_rate, mono)
                    .map_err(|source| AudioSourceError::Decode {
                        path: self.path.clone(),
                        source,
                    })?;
                self.state = LoadState::Loaded(signal);
                self.load(mono)
            }
        }
    }

    /// Duration in seconds, loading (mono) if needed.
    pub fn duration(&mut self) -> Result<f64, AudioSourceError> {
        let frames = self.load(true)?.len();
        Ok(frames as f64 / self.sample_rate as f64)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// File name without extension, used to name output files.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioSource(path='{}', sr={})",
            self.path.display(),
            self.sample_rate
        )
    }
}
