//! Utility functions and helpers.

pub mod date;
pub mod url;

pub use date::{DateRange, roc_date};
pub use url::normalize_detail_link;
