// src/models/mod.rs

//! Domain models for the scraper application.

mod config;
mod course;
mod snapshot;

// Re-export all public types
pub use config::{BrowserSettings, OutputConfig, ScrapeConfig, TargetConfig, TimingConfig};
pub use course::{CourseRecord, RegistrationStatus};
pub use snapshot::{Snapshot, format_snapshot_timestamp};
