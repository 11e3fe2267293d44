use crate::config::{self, FeedConfig, RunOptions};
use crate::convert;
use crate::error::{FeedError, FeedResult};
use crate::export::{self, BatchExporter, BatchReport, SheetOutcome};
use crate::source::{local, LocalSource, RowSource, SheetsSource};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Arguments of the generate command
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub config: PathBuf,
    pub root: PathBuf,
    pub credentials: Option<PathBuf>,
    pub offline: Option<PathBuf>,
    pub dry_run: bool,
    pub fail_on_empty: bool,
}

/// Execute the generate command
pub async fn generate(args: GenerateArgs) -> FeedResult<()> {
    println!("{}", "📥 Sheetfeed - Generating data from Google Sheets".bold().green());
    println!("   Config: {}", args.config.display());
    println!("   Root:   {}", args.root.display());
    if args.dry_run {
        println!("{}", "   📋 DRY RUN MODE - No files will be written".yellow());
    }
    println!();

    let feed = FeedConfig::from_path(&args.config)?;
    let options = RunOptions {
        root: args.root.clone(),
        dry_run: args.dry_run,
        fail_on_empty: args.fail_on_empty,
    };

    let report = match &args.offline {
        Some(dir) => run_batch(&feed, &LocalSource::new(dir), options).await?,
        None => {
            let credentials = config::resolve_credentials(args.credentials.as_deref())?;
            println!("   Auth:   {}", credentials.describe());
            let source =
                SheetsSource::connect(&feed.spreadsheet_id, &credentials, feed.timeout()).await?;
            run_batch(&feed, &source, options).await?
        }
    };

    print_report(&report);
    Ok(())
}

async fn run_batch<S: RowSource + ?Sized>(
    feed: &FeedConfig,
    source: &S,
    options: RunOptions,
) -> FeedResult<BatchReport> {
    println!("   Source: {}", source.describe());
    println!();
    BatchExporter::new(feed, source, options).run().await
}

fn print_report(report: &BatchReport) {
    for entry in &report.sheets {
        match &entry.outcome {
            SheetOutcome::Written { path, records } => println!(
                "   ✅ {} → {} ({} records)",
                entry.sheet.bright_blue().bold(),
                path.display(),
                records
            ),
            SheetOutcome::DryRun { path, records } => println!(
                "   📋 {} → {} ({} records, not written)",
                entry.sheet.bright_blue().bold(),
                path.display(),
                records
            ),
            SheetOutcome::Skipped => println!(
                "   ⚠️  {} skipped: no data",
                entry.sheet.bright_blue().bold()
            ),
        }
    }
    println!();
    println!(
        "{}",
        format!(
            "✅ All data generation complete ({} written, {} skipped)",
            report.written(),
            report.skipped()
        )
        .bold()
        .green()
    );
}

/// Execute the convert command - local rows file → records
pub async fn convert(input: PathBuf, output: Option<PathBuf>) -> FeedResult<()> {
    let content = std::fs::read_to_string(&input).map_err(|source| FeedError::Read {
        path: input.clone(),
        source,
    })?;
    let rows = local::parse_rows(&content)?;

    // Same rule as generate: no data rows, no output
    let records = convert::to_records(&rows)
        .filter(|records| !records.is_empty())
        .ok_or_else(|| FeedError::EmptySheet(sheet_label(&input)))?;

    match output {
        Some(path) => {
            export::write_records(&path, &records).await?;
            println!(
                "{} {} → {} ({} records)",
                "✅".green(),
                input.display(),
                path.display(),
                records.len()
            );
        }
        None => println!("{}", export::render_json(&records)?),
    }
    Ok(())
}

fn sheet_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Execute the check command - validate the feed file
pub fn check(config_path: PathBuf) -> FeedResult<()> {
    println!("{}", "🔍 Sheetfeed - Checking configuration".bold().green());
    println!("   Config: {}\n", config_path.display());

    let feed = FeedConfig::from_path(&config_path)?;

    println!("   Spreadsheet: {}", feed.spreadsheet_id.bright_yellow());
    println!("   Range:       {}", feed.range);
    println!("   Timeout:     {}s", feed.timeout_secs);
    println!("   Sheets:");
    for sheet in &feed.sheets {
        println!(
            "      {} → {}",
            sheet.name.bright_blue().bold(),
            sheet.output.display()
        );
    }
    println!();
    println!("{}", "✅ Configuration is valid".bold().green());
    Ok(())
}
