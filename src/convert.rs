//! Sheet rows → records
//!
//! Row 0 is the header row. Every later row becomes one [`Record`] keyed by
//! the trimmed header names. Cells missing at the end of a short row map to
//! `""`; cells beyond the header row's width are dropped.

use crate::error::FeedResult;
use crate::source::RowSource;
use crate::types::{ExportResult, Record};

/// Convert a sheet's raw rows into records.
///
/// Returns `None` when there are no rows at all (not even a header row).
/// A header-only sheet yields `Some(vec![])`.
///
/// # Example
/// ```
/// use sheetfeed::convert::to_records;
///
/// let rows = vec![
///     vec!["Name".to_string(), "Qty ".to_string()],
///     vec!["Apple".to_string(), "3".to_string()],
///     vec!["Pear".to_string()],
/// ];
/// let records = to_records(&rows).unwrap();
/// assert_eq!(records[1].get("Qty"), Some(""));
/// ```
pub fn to_records(rows: &[Vec<String>]) -> Option<ExportResult> {
    let (header, data) = rows.split_first()?;
    let keys: Vec<&str> = header.iter().map(|h| h.trim()).collect();

    let records = data
        .iter()
        .map(|row| {
            let mut record = Record::with_capacity(keys.len());
            for (index, key) in keys.iter().enumerate() {
                let value = row.get(index).map(|cell| cell.trim()).unwrap_or("");
                record.insert(*key, value);
            }
            record
        })
        .collect();

    Some(records)
}

/// Fetch one sheet through `source` and convert it.
///
/// `Ok(None)` means the source returned no rows for the sheet.
pub async fn fetch_and_convert<S>(
    source: &S,
    sheet: &str,
    range: &str,
) -> FeedResult<Option<ExportResult>>
where
    S: RowSource + ?Sized,
{
    let rows = source.fetch_rows(sheet, range).await?;
    Ok(rows.as_deref().and_then(to_records))
}
