use std::path::Path;

use crate::audio::domain::signal::Signal;

/// Persists a processed signal so the pipeline does not depend on a
/// particular array file format.
pub trait SignalWriter: Send {
    /// Writes `signal` to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, signal: &Signal) -> Result<(), Box<dyn std::error::Error>>;

    /// File extension (without the dot) this writer produces.
    fn extension(&self) -> &str;
}
