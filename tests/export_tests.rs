//! Batch export tests
//!
//! Drives the exporter through the library API with an in-memory source.

use pretty_assertions::assert_eq;
use sheetfeed::config::{FeedConfig, RunOptions};
use sheetfeed::convert::to_records;
use sheetfeed::error::FeedError;
use sheetfeed::export::{BatchExporter, SheetOutcome};
use sheetfeed::source::MemorySource;
use sheetfeed::SheetSource;
use std::fs;
use tempfile::TempDir;

fn feed() -> FeedConfig {
    FeedConfig::new(
        "1cR05XN_ezXbB811eBvhY_-g7bmscmoLfbhzSOpG1U5U",
        vec![
            SheetSource::new("General", "data/feed/general-guide.json"),
            SheetSource::new("Stock", "data/feed/stock.json"),
            SheetSource::new("Cook", "data/feed/cook.json"),
        ],
    )
}

fn full_source() -> MemorySource {
    MemorySource::new()
        .with_sheet(
            "General",
            [vec!["Title ", " Body"], vec!["Water", "Store 4L per person"]],
        )
        .with_sheet("Stock", [vec!["Name", "Qty "], vec!["Apple", "3"], vec!["Pear"]])
        .with_sheet("Cook", [vec!["Dish"], vec!["Soup"], vec!["Bread"]])
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERSION PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_record_count_and_keys_match_header() {
    let header = vec![" a ".to_string(), "b".to_string(), "c ".to_string()];
    let mut rows = vec![header];
    for width in 0..6 {
        rows.push((0..width).map(|i| format!(" v{} ", i)).collect());
    }

    let records = to_records(&rows).unwrap();
    assert_eq!(records.len(), 6);
    for (n, record) in records.iter().enumerate() {
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        let expected_c = if n >= 3 { "v2" } else { "" };
        assert_eq!(record.get("c"), Some(expected_c));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BATCH BEHAVIOR
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_batch_writes_every_sheet_in_order() {
    let dir = TempDir::new().unwrap();
    let config = feed();
    let source = full_source();

    let report = BatchExporter::new(&config, &source, RunOptions::with_root(dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(source.fetched(), vec!["General", "Stock", "Cook"]);
    assert_eq!(report.written(), 3);
    assert_eq!(
        report.sheets[2].outcome,
        SheetOutcome::Written {
            path: dir.path().join("data/feed/cook.json"),
            records: 2
        }
    );

    let stock: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("data/feed/stock.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        stock,
        serde_json::json!([{"Name": "Apple", "Qty": "3"}, {"Name": "Pear", "Qty": ""}])
    );
}

#[tokio::test]
async fn test_output_is_byte_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    let config = feed();
    let source = full_source();
    let exporter = BatchExporter::new(&config, &source, RunOptions::with_root(dir.path()));

    exporter.run().await.unwrap();
    let first = fs::read(dir.path().join("data/feed/general-guide.json")).unwrap();
    exporter.run().await.unwrap();
    let second = fs::read(dir.path().join("data/feed/general-guide.json")).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(first).unwrap(),
        "[\n  {\n    \"Title\": \"Water\",\n    \"Body\": \"Store 4L per person\"\n  }\n]"
    );
}

#[tokio::test]
async fn test_fetch_failure_on_second_sheet_aborts_batch() {
    let dir = TempDir::new().unwrap();
    let config = feed();
    let source = full_source().with_failure("Stock", "HTTP 403: The caller does not have permission");

    let err = BatchExporter::new(&config, &source, RunOptions::with_root(dir.path()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Fetch { ref sheet, .. } if sheet == "Stock"));
    // First sheet stays on disk, third is never attempted
    assert!(dir.path().join("data/feed/general-guide.json").exists());
    assert!(!dir.path().join("data/feed/stock.json").exists());
    assert!(!dir.path().join("data/feed/cook.json").exists());
    assert_eq!(source.fetched(), vec!["General", "Stock"]);
}

#[tokio::test]
async fn test_empty_sheet_leaves_previous_output_untouched() {
    let dir = TempDir::new().unwrap();
    let config = feed();
    let cook = dir.path().join("data/feed/cook.json");
    fs::create_dir_all(cook.parent().unwrap()).unwrap();
    fs::write(&cook, "[]").unwrap();

    let source = full_source().with_sheet("Cook", Vec::<Vec<String>>::new());
    let report = BatchExporter::new(&config, &source, RunOptions::with_root(dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.written(), 2);
    assert_eq!(report.sheets[2].outcome, SheetOutcome::Skipped);
    assert_eq!(fs::read_to_string(&cook).unwrap(), "[]");
}

#[tokio::test]
async fn test_write_failure_aborts_batch() {
    let dir = TempDir::new().unwrap();
    // A file where the output directory should be
    fs::write(dir.path().join("data"), "blocker").unwrap();

    let config = feed();
    let source = full_source();
    let err = BatchExporter::new(&config, &source, RunOptions::with_root(dir.path()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Write { .. }));
    assert_eq!(source.fetched(), vec!["General"]);
}
