/// Audio file extensions accepted by `AudioSource` (compared lower-cased).
pub const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "ogg"];

pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Seed for the train/val/test shuffle, fixed so splits repeat across runs.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Metadata column naming each record's audio file, relative to the data dir.
pub const FILENAME_FIELD: &str = "filename";

pub const NPY_EXTENSION: &str = "npy";

pub const TRAIN_PARTITION: &str = "train";
pub const VALIDATION_PARTITION: &str = "val";
pub const TEST_PARTITION: &str = "test";
