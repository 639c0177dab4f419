use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use super::metadata_reader::MetadataReader;
use super::metadata_record::MetadataRecord;
use super::split_ratios::SplitRatios;
use crate::audio::domain::audio_source::{AudioSource, AudioSourceError};
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::shared::constants::{
    FILENAME_FIELD, TEST_PARTITION, TRAIN_PARTITION, VALIDATION_PARTITION,
};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("{what} not found: {path}")]
    NotFound { what: &'static str, path: PathBuf },
    #[error("failed to read metadata: {0}")]
    Csv(#[from] csv::Error),
    #[error("metadata row {row} has no '{field}' field")]
    MissingField { row: usize, field: &'static str },
    #[error("invalid split ratios ({train}, {validation}, {test}): each must be finite and >= 0")]
    InvalidRatios {
        train: f64,
        validation: f64,
        test: f64,
    },
}

/// Three disjoint, contiguous views over the shuffled records.
#[derive(Debug)]
pub struct DatasetSplit<'a> {
    pub train: &'a [MetadataRecord],
    pub validation: &'a [MetadataRecord],
    pub test: &'a [MetadataRecord],
}

impl<'a> DatasetSplit<'a> {
    /// Partitions in processing order, paired with their output names.
    pub fn partitions(&self) -> [(&'static str, &'a [MetadataRecord]); 3] {
        [
            (TRAIN_PARTITION, self.train),
            (VALIDATION_PARTITION, self.validation),
            (TEST_PARTITION, self.test),
        ]
    }
}

/// Metadata rows joined with the audio files they reference.
pub struct DatasetIndex {
    data_dir: PathBuf,
    metadata_path: PathBuf,
    reader: Box<dyn MetadataReader>,
    records: Vec<MetadataRecord>,
}

impl DatasetIndex {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        metadata_path: impl Into<PathBuf>,
        reader: Box<dyn MetadataReader>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            metadata_path: metadata_path.into(),
            reader,
            records: Vec::new(),
        }
    }

    /// Reads the metadata and keeps rows whose audio file exists, in file
    /// order. Replaces any previously loaded records. Returns the kept count.
    pub fn load_metadata(&mut self) -> Result<usize, DatasetError> {
        ensure_exists("metadata file", &self.metadata_path)?;
        ensure_exists("data directory", &self.data_dir)?;

        let rows = self.reader.read_rows(&self.metadata_path)?;
        let total = rows.len();
        let mut records = Vec::with_capacity(total);
        for (row, fields) in rows.into_iter().enumerate() {
            let filename = fields.get(FILENAME_FIELD).ok_or(DatasetError::MissingField {
                row,
                field: FILENAME_FIELD,
            })?;
            let filepath = self.data_dir.join(filename);
            if filepath.exists() {
                records.push(MetadataRecord::new(fields, filepath));
            } else {
                log::debug!("Skipping metadata row {row}: {} missing", filepath.display());
            }
        }

        log::info!(
            "Loaded {} of {total} metadata rows from {}",
            records.len(),
            self.metadata_path.display()
        );
        self.records = records;
        Ok(self.records.len())
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shuffles the records in place and cuts them into train/val/test.
    ///
    /// The same `seed` over the same loaded order always yields the same
    /// partitions; `None` draws the shuffle from OS entropy.
    pub fn split(&mut self, ratios: &SplitRatios, seed: Option<u64>) -> DatasetSplit<'_> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.records.shuffle(&mut rng);

        let (first, second) = ratios.cut_points(self.records.len());
        let (train, rest) = self.records.split_at(first);
        let (validation, test) = rest.split_at(second - first);
        DatasetSplit {
            train,
            validation,
            test,
        }
    }

    /// One `AudioSource` per record, in the current record order.
    pub fn audio_sources(
        &self,
        sample_rate: u32,
        decoder: Arc<dyn AudioDecoder>,
    ) -> impl Iterator<Item = Result<AudioSource, AudioSourceError>> + '_ {
        self.records
            .iter()
            .map(move |record| AudioSource::new(record.filepath(), sample_rate, decoder.clone()))
    }
}

fn ensure_exists(what: &'static str, path: &Path) -> Result<(), DatasetError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DatasetError::NotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::signal::Signal;
    use crate::dataset::domain::metadata_reader::MetadataRow;
    use std::collections::{BTreeMap, HashSet};
    use std::fs;
    use tempfile::TempDir;

    struct StubReader {
        rows: Vec<MetadataRow>,
    }

    impl MetadataReader for StubReader {
        fn read_rows(&self, _path: &Path) -> Result<Vec<MetadataRow>, DatasetError> {
            Ok(self.rows.clone())
        }
    }

    struct StubDecoder;

    impl AudioDecoder for StubDecoder {
        fn decode(
            &self,
            _path: &Path,
            target_sample_rate: u32,
            _mono: bool,
        ) -> Result<Signal, Box<dyn std::error::Error>> {
            Ok(Signal::mono(vec![0.0; 16], target_sample_rate))
        }
    }

    fn row(filename: &str, label: &str) -> MetadataRow {
        BTreeMap::from([
            ("filename".to_string(), filename.to_string()),
            ("label".to_string(), label.to_string()),
        ])
    }

    /// Temp dataset with `existing` audio files and `missing` rows that
    /// reference absent files, interleaved.
    fn dataset(existing: usize, missing: usize) -> (TempDir, DatasetIndex) {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("audio");
        fs::create_dir_all(&data_dir).unwrap();
        let metadata = dir.path().join("metadata.csv");
        fs::write(&metadata, "filename,label\n").unwrap();

        let mut rows = Vec::new();
        for i in 0..existing.max(missing) {
            if i < existing {
                let name = format!("clip_{i:02}.wav");
                fs::write(data_dir.join(&name), b"").unwrap();
                rows.push(row(&name, "ok"));
            }
            if i < missing {
                rows.push(row(&format!("gone_{i:02}.wav"), "missing"));
            }
        }

        let index = DatasetIndex::new(&data_dir, &metadata, Box::new(StubReader { rows }));
        (dir, index)
    }

    fn names(records: &[MetadataRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.filename().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_load_keeps_only_existing_files_in_order() {
        let (_dir, mut index) = dataset(3, 2);
        assert_eq!(index.load_metadata().unwrap(), 3);
        assert_eq!(
            names(index.records()),
            vec!["clip_00.wav", "clip_01.wav", "clip_02.wav"]
        );
        assert!(index.records().iter().all(|r| r.filepath().exists()));
        assert_eq!(index.records()[0].get("label"), Some("ok"));
    }

    #[test]
    fn test_reload_replaces_records() {
        let (_dir, mut index) = dataset(4, 0);
        index.load_metadata().unwrap();
        index.load_metadata().unwrap();
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_reference_scenario_sizes() {
        let (_dir, mut index) = dataset(8, 2);
        assert_eq!(index.load_metadata().unwrap(), 8);

        let ratios = SplitRatios::new(0.67, 0.17, 0.16).unwrap();
        let split = index.split(&ratios, Some(42));

        assert_eq!(split.train.len(), 5);
        assert_eq!(split.validation.len(), 1);
        assert_eq!(split.test.len(), 2);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let (_dir, mut index) = dataset(20, 0);
        index.load_metadata().unwrap();
        let original: HashSet<String> = names(index.records()).into_iter().collect();

        let split = index.split(&SplitRatios::default(), Some(7));
        let mut seen = HashSet::new();
        for (_, part) in split.partitions() {
            for name in names(part) {
                assert!(seen.insert(name), "record appears in two partitions");
            }
        }
        assert_eq!(seen, original);
    }

    #[test]
    fn test_same_seed_same_partitions() {
        let (_dir_a, mut a) = dataset(12, 0);
        let (_dir_b, mut b) = dataset(12, 0);
        a.load_metadata().unwrap();
        b.load_metadata().unwrap();
        let ratios = SplitRatios::default();

        let split_a = a.split(&ratios, Some(42));
        let split_b = b.split(&ratios, Some(42));

        for ((name_a, part_a), (name_b, part_b)) in
            split_a.partitions().iter().zip(split_b.partitions().iter())
        {
            assert_eq!(name_a, name_b);
            assert_eq!(names(part_a), names(part_b));
        }
    }

    #[test]
    fn test_split_of_empty_index() {
        let (_dir, mut index) = dataset(0, 3);
        index.load_metadata().unwrap();
        let split = index.split(&SplitRatios::default(), Some(42));
        assert!(split.train.is_empty());
        assert!(split.validation.is_empty());
        assert!(split.test.is_empty());
    }

    #[test]
    fn test_unseeded_split_keeps_sizes() {
        let (_dir, mut index) = dataset(10, 0);
        index.load_metadata().unwrap();
        let split = index.split(&SplitRatios::default(), None);
        assert_eq!(
            (split.train.len(), split.validation.len(), split.test.len()),
            (8, 1, 1)
        );
    }

    #[test]
    fn test_partition_names() {
        let (_dir, mut index) = dataset(1, 0);
        index.load_metadata().unwrap();
        let split = index.split(&SplitRatios::default(), Some(1));
        let labels: Vec<_> = split.partitions().iter().map(|(n, _)| *n).collect();
        assert_eq!(labels, vec!["train", "val", "test"]);
    }

    #[test]
    fn test_missing_metadata_file() {
        let dir = TempDir::new().unwrap();
        let mut index = DatasetIndex::new(
            dir.path(),
            dir.path().join("absent.csv"),
            Box::new(StubReader { rows: vec![] }),
        );
        assert!(matches!(
            index.load_metadata(),
            Err(DatasetError::NotFound {
                what: "metadata file",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let metadata = dir.path().join("metadata.csv");
        fs::write(&metadata, "filename\n").unwrap();
        let mut index = DatasetIndex::new(
            dir.path().join("audio"),
            &metadata,
            Box::new(StubReader { rows: vec![] }),
        );
        assert!(matches!(
            index.load_metadata(),
            Err(DatasetError::NotFound {
                what: "data directory",
                ..
            })
        ));
    }

    #[test]
    fn test_row_without_filename_fails() {
        let dir = TempDir::new().unwrap();
        let metadata = dir.path().join("metadata.csv");
        fs::write(&metadata, "label\n").unwrap();
        let rows = vec![BTreeMap::from([("label".to_string(), "x".to_string())])];
        let mut index = DatasetIndex::new(dir.path(), &metadata, Box::new(StubReader { rows }));
        assert!(matches!(
            index.load_metadata(),
            Err(DatasetError::MissingField { row: 0, .. })
        ));
    }

    #[test]
    fn test_audio_sources_follow_records() {
        let (_dir, mut index) = dataset(3, 0);
        index.load_metadata().unwrap();
        let sources: Vec<AudioSource> = index
            .audio_sources(16000, Arc::new(StubDecoder))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].stem(), "clip_00");
        assert_eq!(sources[2].sample_rate(), 16000);
    }
}
