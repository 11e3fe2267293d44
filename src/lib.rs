//! Sheetfeed - Google Sheets → JSON data feed for static sites
//!
//! Pulls each configured sheet, maps every row under the header row to a
//! flat object keyed by the trimmed header names, and writes one JSON array
//! per sheet.
//!
//! # Features
//!
//! - Sequential, fail-fast batch over an ordered list of sheets
//! - Service account (JWT) or API key authentication
//! - Pluggable row sources: Google Sheets, local JSON files, in-memory
//! - Byte-stable output: rerunning with unchanged data rewrites identical files
//!
//! # Example
//!
//! ```no_run
//! use sheetfeed::config::{FeedConfig, RunOptions};
//! use sheetfeed::export::BatchExporter;
//! use sheetfeed::source::LocalSource;
//! use std::path::Path;
//!
//! # async fn run() -> sheetfeed::FeedResult<()> {
//! let config = FeedConfig::from_path(Path::new("feed.yaml"))?;
//! let source = LocalSource::new("fixtures");
//! let report = BatchExporter::new(&config, &source, RunOptions::default())
//!     .run()
//!     .await?;
//! println!("Written: {}", report.written());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use error::{FeedError, FeedResult};
pub use types::{ExportResult, RawRowSet, Record, SheetSource};
