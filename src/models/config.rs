//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScrapeConfig {
    /// Target site settings
    #[serde(default)]
    pub target: TargetConfig,

    /// Navigation timeouts and pacing delays
    #[serde(default)]
    pub timing: TimingConfig,

    /// Headless browser settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Snapshot output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl ScrapeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.target.listing_url)
            .map_err(|e| AppError::config(format!("target.listing_url is invalid: {e}")))?;
        Url::parse(&self.target.base_origin)
            .map_err(|e| AppError::config(format!("target.base_origin is invalid: {e}")))?;
        if self.target.lookahead_days <= 0 {
            return Err(AppError::config("target.lookahead_days must be > 0"));
        }
        if self.timing.nav_timeout_secs == 0 {
            return Err(AppError::config("timing.nav_timeout_secs must be > 0"));
        }
        if self.timing.detail_timeout_secs == 0 {
            return Err(AppError::config("timing.detail_timeout_secs must be > 0"));
        }
        if self.timing.pacing_min_ms > self.timing.pacing_max_ms {
            return Err(AppError::config(
                "timing.pacing_min_ms must not exceed timing.pacing_max_ms",
            ));
        }
        if self.output.snapshot_path.trim().is_empty() {
            return Err(AppError::config("output.snapshot_path is empty"));
        }
        Ok(())
    }
}

/// Target site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Course-query listing page URL
    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    /// Origin used to absolutize relative detail links
    #[serde(default = "defaults::base_origin")]
    pub base_origin: String,

    /// Search window length in days, starting today
    #[serde(default = "defaults::lookahead_days")]
    pub lookahead_days: i64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            listing_url: defaults::listing_url(),
            base_origin: defaults::base_origin(),
            lookahead_days: defaults::lookahead_days(),
        }
    }
}

/// Navigation timeouts and pacing delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Timeout for the listing-page navigation in seconds
    #[serde(default = "defaults::nav_timeout")]
    pub nav_timeout_secs: u64,

    /// Timeout for each detail-page navigation in seconds
    #[serde(default = "defaults::detail_timeout")]
    pub detail_timeout_secs: u64,

    /// Fixed delay after submitting the query, waiting for the table to render
    #[serde(default = "defaults::settle_ms")]
    pub settle_ms: u64,

    /// Lower bound of the random inter-row delay in milliseconds
    #[serde(default = "defaults::pacing_min")]
    pub pacing_min_ms: u64,

    /// Upper bound of the random inter-row delay in milliseconds
    #[serde(default = "defaults::pacing_max")]
    pub pacing_max_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            nav_timeout_secs: defaults::nav_timeout(),
            detail_timeout_secs: defaults::detail_timeout(),
            settle_ms: defaults::settle_ms(),
            pacing_min_ms: defaults::pacing_min(),
            pacing_max_ms: defaults::pacing_max(),
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// User-Agent string presented by the browser
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Run the browser without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            headless: defaults::headless(),
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON snapshot, overwritten on every run
    #[serde(default = "defaults::snapshot_path")]
    pub snapshot_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: defaults::snapshot_path(),
        }
    }
}

mod defaults {
    pub fn listing_url() -> String {
        "https://www.tshp.org.tw/ehc-tshp/s/w/edu/teachMst/teachMstB2".into()
    }
    pub fn base_origin() -> String {
        "https://www.tshp.org.tw".into()
    }
    pub fn lookahead_days() -> i64 {
        180
    }

    pub fn nav_timeout() -> u64 {
        60
    }
    pub fn detail_timeout() -> u64 {
        15
    }
    pub fn settle_ms() -> u64 {
        3000
    }
    pub fn pacing_min() -> u64 {
        500
    }
    pub fn pacing_max() -> u64 {
        1500
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn headless() -> bool {
        true
    }

    pub fn snapshot_path() -> String {
        "data.json".into()
    }
}
