// src/utils/date.rs

//! ROC (Minguo) calendar date formatting.
//!
//! The TSHP site expects dates in the Republic-of-China era format, where the
//! year is the civil year minus 1911 (e.g. 2024-03-05 → `113/03/05`).

use chrono::{Datelike, Duration, NaiveDate};

/// Offset between the civil (Gregorian) year and the ROC era year.
const ROC_YEAR_OFFSET: i32 = 1911;

/// Format a civil date in the site's ROC date format.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use tshp_scraper::utils::roc_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(roc_date(date), "113/03/05");
/// ```
pub fn roc_date(date: NaiveDate) -> String {
    format!(
        "{}/{:02}/{:02}",
        date.year() - ROC_YEAR_OFFSET,
        date.month(),
        date.day()
    )
}

/// Search window for the course query form, already in ROC format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Build a range covering `start` through `start + lookahead_days`.
    pub fn lookahead(start: NaiveDate, lookahead_days: i64) -> Self {
        let end = start + Duration::days(lookahead_days);
        Self {
            start: roc_date(start),
            end: roc_date(end),
        }
    }
}
