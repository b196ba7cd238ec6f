//! Snapshot document produced by one scrape run.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::CourseRecord;

/// Timezone the snapshot timestamp is rendered in (site-local, UTC+8).
const SNAPSHOT_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Format a wall-clock instant as the snapshot's `last_updated` string.
pub fn format_snapshot_timestamp(instant: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(SNAPSHOT_UTC_OFFSET_SECS).expect("valid fixed offset");
    instant
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S (GMT+8)")
        .to_string()
}

/// The single output document of a run. Each run fully replaces the previous
/// snapshot; there is no merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Completion time of the run, fixed UTC+8 rendering
    pub last_updated: String,

    /// Course records in listing-table order
    pub data: Vec<CourseRecord>,
}

impl Snapshot {
    /// Build a snapshot stamped with the current wall-clock time.
    pub fn new(records: Vec<CourseRecord>) -> Self {
        Self::at(Utc::now(), records)
    }

    /// Build a snapshot stamped with an explicit instant.
    pub fn at(instant: DateTime<Utc>, records: Vec<CourseRecord>) -> Self {
        Self {
            last_updated: format_snapshot_timestamp(instant),
            data: records,
        }
    }
}
