use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::shared::constants::FILENAME_FIELD;

/// One metadata row whose audio file exists, with its path resolved against
/// the data directory. Every CSV field is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
    filepath: PathBuf,
}

impl MetadataRecord {
    pub fn new(fields: BTreeMap<String, String>, filepath: PathBuf) -> Self {
        Self { fields, filepath }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn filename(&self) -> Option<&str> {
        self.get(FILENAME_FIELD)
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}
