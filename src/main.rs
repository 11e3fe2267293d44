use clap::{Parser, Subcommand};
use sheetfeed::cli::{self, GenerateArgs};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sheetfeed")]
#[command(about = "Pull Google Sheets tabs into JSON files for a static site build.")]
#[command(long_about = "Sheetfeed - Google Sheets → JSON build step

Fetches each configured sheet, turns every row under the header row into a
flat object keyed by the (trimmed) header names, and writes one pretty-printed
JSON array per sheet. Sheets run in order; the first failure stops the run
with a non-zero exit code so the site build fails instead of shipping
partial data.

COMMANDS:
  generate  - Fetch all configured sheets and write their JSON files
  convert   - Convert a local rows file (JSON array of arrays) to records
  check     - Validate the feed configuration

CREDENTIALS (first match wins):
  --credentials key.json         Service account key file
  GOOGLE_SERVICE_ACCOUNT_KEY     Service account key JSON (inline)
  GOOGLE_SHEETS_API_KEY          API key, public sheets only
  A .env file in the working directory is loaded first.

EXAMPLES:
  sheetfeed generate                        # Uses ./feed.yaml
  sheetfeed generate -c feed.yaml --root site
  sheetfeed generate --offline fixtures/    # Read <sheet>.json files instead
  sheetfeed convert rows.json data/out.json")]
#[command(version)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all configured sheets and write their JSON files
    Generate {
        /// Feed configuration file
        #[arg(short, long, default_value = "feed.yaml", env = "SHEETFEED_CONFIG")]
        config: PathBuf,

        /// Directory output paths are relative to
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Service account key file (overrides environment credentials)
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Read sheets from <DIR>/<sheet>.json instead of Google Sheets
        #[arg(long, value_name = "DIR")]
        offline: Option<PathBuf>,

        /// Fetch and convert without writing files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Treat a sheet without data rows as an error
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Convert a local rows file (JSON array of arrays) to records.
    ///
    /// Like generate, an input without data rows (empty or header only) is
    /// reported as an empty sheet and nothing is written.
    Convert {
        /// Rows file
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        output: Option<PathBuf>,
    },

    /// Validate the feed configuration
    Check {
        /// Feed configuration file
        #[arg(short, long, default_value = "feed.yaml", env = "SHEETFEED_CONFIG")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal in CI, where the key comes from the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            config,
            root,
            credentials,
            offline,
            dry_run,
            fail_on_empty,
        } => {
            cli::generate(GenerateArgs {
                config,
                root,
                credentials,
                offline,
                dry_run,
                fail_on_empty,
            })
            .await
        }

        Commands::Convert { input, output } => cli::convert(input, output).await,

        Commands::Check { config } => cli::check(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
