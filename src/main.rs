use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use feedscout::batch;
use feedscout::config::Config;
use feedscout::export::{self, OutputPaths};
use feedscout::feed::Fetcher;
use feedscout::input::{self, InputError};

#[derive(Parser, Debug)]
#[command(
    name = "feedscout",
    about = "Find and validate RSS/Atom feeds for a spreadsheet of websites"
)]
struct Args {
    /// Spreadsheet (.xlsx, .xls, .ods) or CSV file with a URL column
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Optional TOML file overriding timeouts, retries and pauses
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for feeds.js, feeds.json and feed_audit.csv
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,
}

/// How a run ended when it did not fail with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Success,
    /// Input file does not exist (same code as clap usage errors)
    Usage,
    /// Spreadsheet input but the `xlsx` feature was compiled out
    MissingSupport,
}

impl Exit {
    fn code(self) -> i32 {
        match self {
            Exit::Success => 0,
            Exit::Usage => 2,
            Exit::MissingSupport => 1,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match run(args).await? {
        Exit::Success => Ok(()),
        exit => std::process::exit(exit.code()),
    }
}

async fn run(args: Args) -> Result<Exit> {
    if !args.input.exists() {
        eprintln!("Input file not found: {}", args.input.display());
        return Ok(Exit::Usage);
    }

    // Before any fetching
    let output_dir = args.output_dir.canonicalize().with_context(|| {
        format!(
            "Output directory does not exist: {}",
            args.output_dir.display()
        )
    })?;

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };
    tracing::debug!(config = ?config, "Using configuration");

    let sites = match input::read_site_urls(&args.input) {
        Ok(sites) => sites,
        Err(InputError::SpreadsheetSupportMissing) => {
            eprintln!("Error: {}", InputError::SpreadsheetSupportMissing);
            return Ok(Exit::MissingSupport);
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to read site URLs from {}", args.input.display())
            });
        }
    };
    println!("Found {} site(s) to check.", sites.len());

    let fetcher = Fetcher::new(config.fetch_policy()).context("Failed to create HTTP client")?;
    let report = batch::run(&fetcher, &sites, config.site_delay()).await;

    export::write_all(&report.feeds, &report.audit, &OutputPaths::in_dir(&output_dir))?;

    println!();
    println!("Done. Valid feeds: {}", report.feeds.len());
    if report.error_count() > 0 {
        println!(
            "{} site(s) failed; see {} for details.",
            report.error_count(),
            export::AUDIT_CSV
        );
    }

    Ok(Exit::Success)
}
