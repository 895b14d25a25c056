use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use plus500_sentiment::config::{FetchConfig, DEFAULT_BASE_URL, DEFAULT_OUTPUT_DIR, DEFAULT_REQUEST_DELAY_MS};
use plus500_sentiment::market_data::{self, Plus500Client, SentimentLive};

/// Archives Plus500 buyer/seller sentiment for a list of instruments
#[derive(Parser, Debug)]
#[command(name = "sentiment_archiver")]
struct Args {
    /// Comma separated file of instrument ids
    #[arg(short, long)]
    input: PathBuf,

    /// Existing directory for the csv outputs
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,

    /// Pause after each instrument request
    #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY_MS)]
    delay_ms: u64,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Connect and read timeout, http client default if unset
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let instruments = market_data::read_input_instruments(&args.input)?;
    info!("Loaded {} instruments from {}", instruments.len(), args.input.display());

    let config = FetchConfig::default()
        .with_base_url(&args.base_url)
        .with_timeout(args.timeout_secs.map(Duration::from_secs));
    let mut live = SentimentLive::new(Plus500Client::new(config), Duration::from_millis(args.delay_ms));

    let snapshot = live.fetch_instruments(&instruments)
        .context("Instrument fetch aborted")?;

    let run_time = Local::now().naive_local();
    let snapshot_path = market_data::write_results(&snapshot, &args.output, &run_time)
        .with_context(|| format!("Unable to write results to {}", args.output.display()))?;

    let summary = live.summary();
    info!("Finished: {} instruments saved, {} without data, {} http failures. Snapshot {}",
        summary.succeeded, summary.no_data, summary.http_errors, snapshot_path.display());
    Ok(())
}
