//! TSHP course scraper CLI.
//!
//! Launches headless Chromium, runs one extraction pass over the course-query
//! page, and overwrites the JSON snapshot.

use std::path::PathBuf;

use clap::Parser;
use tshp_scraper::{
    driver::ChromiumDriver, error::Result, models::ScrapeConfig, pipeline, storage::LocalStorage,
};

/// TSHP continuing-education course scraper
#[derive(Parser, Debug)]
#[command(name = "tshp-scraper", version, about = "TSHP course listing scraper")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the snapshot output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("TSHP course scraper starting...");

    let mut config = ScrapeConfig::load_or_default(&cli.config);
    if let Some(output) = cli.output {
        config.output.snapshot_path = output.display().to_string();
    }
    config.validate()?;

    let storage = LocalStorage::new(&config.output.snapshot_path);

    log::info!("Launching headless browser...");
    let mut driver = ChromiumDriver::launch(&config.browser).await?;

    let summary = pipeline::run_scrape(&config, &mut driver, &storage).await?;

    if summary.aborted {
        log::warn!("Run aborted early; the snapshot holds partial results");
    }
    if summary.detail_failures > 0 {
        log::warn!(
            "{} detail pages could not be read",
            summary.detail_failures
        );
    }
    log::info!(
        "{} records saved to {} ({} rows skipped)",
        summary.record_count,
        summary.snapshot_path.display(),
        summary.rows_skipped
    );

    log::info!("Done!");
    Ok(())
}
