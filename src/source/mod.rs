//! Row sources - where sheet rows come from

pub mod local;
pub mod memory;
pub mod sheets;

pub use local::LocalSource;
pub use memory::MemorySource;
pub use sheets::SheetsSource;

use crate::error::FeedResult;
use crate::types::RawRowSet;
use async_trait::async_trait;

/// Capability to fetch a named sheet's cell range as rows of strings.
///
/// `Ok(None)` means the source holds no values for the range at all.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self, sheet: &str, range: &str) -> FeedResult<Option<RawRowSet>>;

    /// Short human-readable description, used in progress output
    fn describe(&self) -> String;
}
