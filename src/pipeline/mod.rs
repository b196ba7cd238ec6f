//! Pipeline entry points for scraper operations.

pub mod extract;

use std::path::PathBuf;

pub use extract::{CourseExtractor, ExtractOutcome};

use crate::driver::PageDriver;
use crate::error::Result;
use crate::models::{ScrapeConfig, Snapshot};
use crate::storage::SnapshotStorage;

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Records written to the snapshot
    pub record_count: usize,
    /// Header/malformed rows discarded
    pub rows_skipped: usize,
    /// Rows whose detail page could not be read
    pub detail_failures: usize,
    /// Where the snapshot landed
    pub snapshot_path: PathBuf,
    /// True when the extraction aborted early and the snapshot is partial
    pub aborted: bool,
}

/// Run one full scrape: extract, tear the browser down, persist the snapshot.
///
/// The browser is shut down and the snapshot written even when the extraction
/// aborted partway; a partial record set beats losing the run.
pub async fn run_scrape(
    config: &ScrapeConfig,
    driver: &mut dyn PageDriver,
    storage: &dyn SnapshotStorage,
) -> Result<RunSummary> {
    let extractor = CourseExtractor::new(config.clone());
    let outcome = extractor.run(&*driver).await;

    if let Err(e) = driver.shutdown().await {
        log::warn!("Browser shutdown failed: {e}");
    }

    if let Some(reason) = &outcome.fatal {
        log::error!(
            "Run aborted early ({reason}); saving the {} records collected so far",
            outcome.records.len()
        );
    }

    let aborted = outcome.fatal.is_some();
    let rows_skipped = outcome.rows_skipped;
    let detail_failures = outcome.detail_failures;

    let snapshot = Snapshot::new(outcome.records);
    let summary = storage.write_snapshot(&snapshot).await?;

    log::info!(
        "Saved {} records to {}",
        summary.record_count,
        summary.location.display()
    );

    Ok(RunSummary {
        record_count: summary.record_count,
        rows_skipped,
        detail_failures,
        snapshot_path: summary.location,
        aborted,
    })
}
