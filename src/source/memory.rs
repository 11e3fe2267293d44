use super::RowSource;
use crate::error::{FeedError, FeedResult};
use crate::types::RawRowSet;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory row source with optional injected failures.
///
/// Records every fetched sheet name so callers can assert on fetch order.
#[derive(Debug, Default)]
pub struct MemorySource {
    sheets: HashMap<String, RawRowSet>,
    failures: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet with the given rows
    pub fn with_sheet<R, C>(mut self, name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.sheets.insert(name.to_string(), rows);
        self
    }

    /// Make every fetch of `name` fail with `message`
    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.failures.insert(name.to_string(), message.to_string());
        self
    }

    /// Sheet names fetched so far, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RowSource for MemorySource {
    async fn fetch_rows(&self, sheet: &str, _range: &str) -> FeedResult<Option<RawRowSet>> {
        if let Ok(mut names) = self.fetched.lock() {
            names.push(sheet.to_string());
        }

        if let Some(message) = self.failures.get(sheet) {
            return Err(FeedError::fetch(sheet, message.clone()));
        }

        match self.sheets.get(sheet) {
            Some(rows) if rows.is_empty() => Ok(None),
            Some(rows) => Ok(Some(rows.clone())),
            None => Err(FeedError::fetch(
                sheet,
                format!("Unable to parse range: {}", sheet),
            )),
        }
    }

    fn describe(&self) -> String {
        format!("memory ({} sheets)", self.sheets.len())
    }
}
