//! Storage abstractions for snapshot persistence.
//!
//! A run produces exactly one [`Snapshot`] document which fully replaces the
//! previous one. There is no merge and no history.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a snapshot write.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Number of records in the written snapshot
    pub record_count: usize,
    /// Where the snapshot landed
    pub location: PathBuf,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Persist the snapshot, fully overwriting any previous one.
    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<WriteSummary>;

    /// Load the current snapshot, or `None` if none has been written yet.
    async fn load_snapshot(&self) -> Result<Option<Snapshot>>;
}
