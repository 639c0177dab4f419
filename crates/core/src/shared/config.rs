use std::path::{Path, PathBuf};

use crate::dataset::domain::split_ratios::SplitRatios;
use crate::shared::constants::{DEFAULT_SAMPLE_RATE, DEFAULT_SPLIT_SEED};

/// Every path and parameter of a preprocessing run.
///
/// `Default` reproduces the stock invocation: `sample_data/` in, `processed/`
/// out, a 67/17/16 split and a light augmentation chain.
#[derive(Clone, Debug, PartialEq)]
pub struct PreprocessConfig {
    pub data_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub output_dir: PathBuf,
    pub sample_rate: u32,
    pub split_ratios: SplitRatios,
    pub split_seed: u64,
    pub top_db: f32,
    pub noise_level: f32,
    pub stretch_rate: f32,
    pub pitch_steps: f32,
}

impl PreprocessConfig {
    /// Re-roots the data, metadata and output paths under `base`.
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        self.data_dir = base.join(&self.data_dir);
        self.metadata_path = base.join(&self.metadata_path);
        self.output_dir = base.join(&self.output_dir);
        self
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("sample_data/audio"),
            metadata_path: PathBuf::from("sample_data/metadata.csv"),
            output_dir: PathBuf::from("processed"),
            sample_rate: DEFAULT_SAMPLE_RATE,
            // Constant ratios known to be valid.
            split_ratios: SplitRatios::unchecked(0.67, 0.17, 0.16),
            split_seed: DEFAULT_SPLIT_SEED,
            top_db: 20.0,
            noise_level: 0.01,
            stretch_rate: 1.05,
            pitch_steps: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_are_relative() {
        let config = PreprocessConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("sample_data/audio"));
        assert_eq!(config.metadata_path, PathBuf::from("sample_data/metadata.csv"));
        assert_eq!(config.output_dir, PathBuf::from("processed"));
    }

    #[test]
    fn test_default_parameters() {
        let config = PreprocessConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.split_seed, 42);
        assert_eq!(config.split_ratios.as_tuple(), (0.67, 0.17, 0.16));
        assert_eq!(config.noise_level, 0.01);
        assert_eq!(config.stretch_rate, 1.05);
        assert_eq!(config.pitch_steps, 1.0);
    }

    #[test]
    fn test_with_base_dir_reroots_paths() {
        let config = PreprocessConfig::default().with_base_dir(Path::new("/data/project"));
        assert_eq!(config.data_dir, PathBuf::from("/data/project/sample_data/audio"));
        assert_eq!(
            config.metadata_path,
            PathBuf::from("/data/project/sample_data/metadata.csv")
        );
        assert_eq!(config.output_dir, PathBuf::from("/data/project/processed"));
    }
}
