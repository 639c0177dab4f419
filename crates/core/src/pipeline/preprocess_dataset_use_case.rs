use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rand::RngCore;

use crate::audio::domain::audio_source::AudioSource;
use crate::audio::domain::transform::Transform;
use crate::dataset::domain::dataset_index::DatasetSplit;
use crate::dataset::domain::metadata_record::MetadataRecord;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::media::domain::signal_writer::SignalWriter;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Per-partition report: file count and mean output duration.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionSummary {
    pub name: String,
    pub files: usize,
    /// `None` when the partition had no files.
    pub mean_duration_secs: Option<f64>,
}

impl fmt::Display for PartitionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mean_duration_secs {
            Some(mean) => write!(
                f,
                "{}: {} files, mean duration {mean:.2} s",
                self.name, self.files
            ),
            None => write!(f, "{}: partition empty", self.name),
        }
    }
}

/// Decodes, preprocesses, augments, normalizes and writes every file of a
/// dataset split, one file at a time.
pub struct PreprocessDatasetUseCase {
    decoder: Arc<dyn AudioDecoder>,
    writer: Box<dyn SignalWriter>,
    preprocess: Box<dyn Transform>,
    augment: Box<dyn Transform>,
    finalize: Box<dyn Transform>,
    sample_rate: u32,
}

impl PreprocessDatasetUseCase {
    pub fn new(
        decoder: Arc<dyn AudioDecoder>,
        writer: Box<dyn SignalWriter>,
        preprocess: Box<dyn Transform>,
        augment: Box<dyn Transform>,
        finalize: Box<dyn Transform>,
        sample_rate: u32,
    ) -> Self {
        Self {
            decoder,
            writer,
            preprocess,
            augment,
            finalize,
            sample_rate,
        }
    }

    /// Processes `train`, `val` and `test` in that order.
    pub fn execute(
        &self,
        split: &DatasetSplit<'_>,
        out_root: &Path,
        rng: &mut dyn RngCore,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<PartitionSummary>, Box<dyn std::error::Error>> {
        let mut summaries = Vec::with_capacity(3);
        for (name, records) in split.partitions() {
            summaries.push(self.process_partition(name, records, out_root, rng, logger)?);
        }
        logger.summary();
        Ok(summaries)
    }

    /// Writes `out_root/<name>/<stem>.<ext>` for each record.
    ///
    /// The first failure aborts the partition; files written before it stay
    /// on disk.
    pub fn process_partition(
        &self,
        name: &str,
        records: &[MetadataRecord],
        out_root: &Path,
        rng: &mut dyn RngCore,
        logger: &mut dyn PipelineLogger,
    ) -> Result<PartitionSummary, Box<dyn std::error::Error>> {
        let out_dir = out_root.join(name);
        fs::create_dir_all(&out_dir)?;

        let total = records.len();
        let mut total_frames = 0usize;
        let mut last_rate = self.sample_rate;

        for (i, record) in records.iter().enumerate() {
            let mut source =
                AudioSource::new(record.filepath(), self.sample_rate, self.decoder.clone())?;

            let t = Instant::now();
            let decoded = source.load(true)?;
            logger.timing("decode", elapsed_ms(t));

            let t = Instant::now();
            let signal = self.preprocess.apply(decoded, rng)?;
            logger.timing("preprocess", elapsed_ms(t));

            let t = Instant::now();
            let signal = self.augment.apply(&signal, rng)?;
            logger.timing("augment", elapsed_ms(t));

            let t = Instant::now();
            let signal = self.finalize.apply(&signal, rng)?;
            logger.timing("normalize", elapsed_ms(t));

            let t = Instant::now();
            let path = out_dir.join(format!("{}.{}", source.stem(), self.writer.extension()));
            self.writer.write(&path, &signal)?;
            logger.timing("write", elapsed_ms(t));

            total_frames += signal.len();
            last_rate = signal.sample_rate();
            logger.metric("output_duration_secs", signal.duration());
            logger.progress(name, i + 1, total);
        }

        let summary = PartitionSummary {
            name: name.to_string(),
            files: total,
            mean_duration_secs: (total > 0)
                .then(|| total_frames as f64 / total as f64 / last_rate as f64),
        };
        logger.info(&summary.to_string());
        Ok(summary)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
