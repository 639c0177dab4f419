use std::collections::BTreeMap;
use std::path::Path;

use super::dataset_index::DatasetError;

/// One metadata row: column name to raw string value.
pub type MetadataRow = BTreeMap<String, String>;

/// Reads tabular metadata so the index does not depend on a file format.
pub trait MetadataReader: Send {
    /// Returns every data row in file order, keyed by the header names.
    fn read_rows(&self, path: &Path) -> Result<Vec<MetadataRow>, DatasetError>;
}
