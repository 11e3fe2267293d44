use super::RowSource;
use crate::error::{FeedError, FeedResult};
use crate::types::RawRowSet;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Reads sheets from `<dir>/<sheet>.json` files.
///
/// Each file holds a JSON array of rows, each row an array of cell strings.
/// A `null` cell reads as `""`.
#[derive(Debug, Clone)]
pub struct LocalSource {
    dir: PathBuf,
}

impl LocalSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File a sheet is read from. The sheet name must be a single plain
    /// file name component so reads stay inside the directory.
    pub fn sheet_path(&self, sheet: &str) -> FeedResult<PathBuf> {
        let file = PathBuf::from(format!("{}.json", sheet));
        let mut components = file.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(file)),
            _ => Err(FeedError::fetch(
                sheet,
                format!("name is not a plain file name under {}", self.dir.display()),
            )),
        }
    }
}

/// Parse a rows file body (array of arrays of strings or nulls)
pub fn parse_rows(content: &str) -> FeedResult<RawRowSet> {
    let rows: Vec<Vec<Option<String>>> = serde_json::from_str(content)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
        .collect())
}

#[async_trait]
impl RowSource for LocalSource {
    async fn fetch_rows(&self, sheet: &str, _range: &str) -> FeedResult<Option<RawRowSet>> {
        let path = self.sheet_path(sheet)?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FeedError::fetch(sheet, format!("{}: {}", path.display(), e)))?;

        let rows = parse_rows(&content)
            .map_err(|e| FeedError::fetch(sheet, format!("{}: {}", path.display(), e)))?;

        Ok((!rows.is_empty()).then_some(rows))
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.dir.display())
    }
}
