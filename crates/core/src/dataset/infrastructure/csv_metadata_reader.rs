use std::path::Path;

use crate::dataset::domain::dataset_index::DatasetError;
use crate::dataset::domain::metadata_reader::{MetadataReader, MetadataRow};

/// Reads UTF-8 CSV metadata with a header row.
///
/// Ragged rows are accepted: a short row simply lacks its trailing fields
/// and values beyond the header are dropped.
pub struct CsvMetadataReader;

impl MetadataReader for CsvMetadataReader {
    fn read_rows(&self, path: &Path) -> Result<Vec<MetadataRow>, DatasetError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() > headers.len() {
                log::debug!(
                    "Ignoring {} extra field(s) on metadata line {}",
                    record.len() - headers.len(),
                    record.position().map_or(0, |p| p.line())
                );
            }
            let row = headers
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}
