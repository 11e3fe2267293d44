//! Batch export: every configured sheet → one JSON file
//!
//! Sheets run strictly in configuration order. The first fetch or write
//! failure aborts the batch; files already written by earlier sheets stay on
//! disk. An empty sheet is skipped with a warning unless
//! [`RunOptions::fail_on_empty`] is set.

use crate::config::{FeedConfig, RunOptions};
use crate::convert;
use crate::error::{FeedError, FeedResult};
use crate::source::RowSource;
use crate::types::{ExportResult, SheetSource};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What happened to one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOutcome {
    Written { path: PathBuf, records: usize },
    DryRun { path: PathBuf, records: usize },
    Skipped,
}

/// Outcome of one sheet, tagged with its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReport {
    pub sheet: String,
    pub outcome: SheetOutcome,
}

/// Outcome of a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub sheets: Vec<SheetReport>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, SheetOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SheetOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&SheetOutcome) -> bool) -> usize {
        self.sheets.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Serialize records the way the site expects them: two-space indented
/// JSON, no trailing newline.
pub fn render_json(records: &ExportResult) -> FeedResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write records to `path`, creating parent directories and replacing any
/// previous content.
pub async fn write_records(path: &Path, records: &ExportResult) -> FeedResult<()> {
    let json = render_json(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FeedError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, json)
        .await
        .map_err(|source| FeedError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Drives a batch over one row source
pub struct BatchExporter<'a, S: RowSource + ?Sized> {
    config: &'a FeedConfig,
    source: &'a S,
    options: RunOptions,
}

impl<'a, S: RowSource + ?Sized> BatchExporter<'a, S> {
    pub fn new(config: &'a FeedConfig, source: &'a S, options: RunOptions) -> Self {
        Self {
            config,
            source,
            options,
        }
    }

    /// Absolute-or-root-relative path a sheet is written to
    pub fn output_path(&self, sheet: &SheetSource) -> PathBuf {
        self.options.root.join(&sheet.output)
    }

    /// Run every configured sheet in order, stopping at the first failure
    pub async fn run(&self) -> FeedResult<BatchReport> {
        info!(
            sheets = self.config.sheets.len(),
            source = %self.source.describe(),
            "starting data generation"
        );

        let mut report = BatchReport::default();
        for sheet in &self.config.sheets {
            let outcome = self.export_sheet(sheet).await.inspect_err(|e| {
                error!(sheet = %sheet.name, error = %e, "error processing sheet");
            })?;
            report.sheets.push(SheetReport {
                sheet: sheet.name.clone(),
                outcome,
            });
        }

        info!(
            written = report.written(),
            skipped = report.skipped(),
            "all data generation complete"
        );
        Ok(report)
    }

    /// Fetch, convert and write a single sheet
    pub async fn export_sheet(&self, sheet: &SheetSource) -> FeedResult<SheetOutcome> {
        let records =
            convert::fetch_and_convert(self.source, &sheet.name, &self.config.range).await?;

        let records = match records {
            Some(records) if !records.is_empty() => records,
            _ if self.options.fail_on_empty => {
                return Err(FeedError::EmptySheet(sheet.name.clone()));
            }
            _ => {
                warn!(sheet = %sheet.name, "no data found in sheet, skipping");
                return Ok(SheetOutcome::Skipped);
            }
        };

        let path = self.output_path(sheet);
        if self.options.dry_run {
            info!(sheet = %sheet.name, path = %path.display(), records = records.len(), "dry run, not writing");
            return Ok(SheetOutcome::DryRun {
                path,
                records: records.len(),
            });
        }

        write_records(&path, &records).await?;
        info!(
            sheet = %sheet.name,
            path = %sheet.output.display(),
            records = records.len(),
            "generated output"
        );

        Ok(SheetOutcome::Written {
            path,
            records: records.len(),
        })
    }
}
