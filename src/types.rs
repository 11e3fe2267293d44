use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//==============================================================================
// Configuration Types
//==============================================================================

/// One sheet to export and the file it lands in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSource {
    /// Sheet (tab) name inside the spreadsheet
    pub name: String,
    /// Output path, relative to the run root
    #[serde(alias = "outputPath")]
    pub output: PathBuf,
}

impl SheetSource {
    pub fn new(name: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
        }
    }
}

//==============================================================================
// Row and Record Types
//==============================================================================

/// Rows of cell strings as returned by a data source. Rows may be shorter
/// than the header row when trailing cells are empty.
pub type RawRowSet = Vec<Vec<String>>;

/// One flat object derived from one data row.
///
/// Keys keep header column order. Inserting an existing key replaces the
/// value but keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Records for one sheet, in row order
pub type ExportResult = Vec<Record>;
