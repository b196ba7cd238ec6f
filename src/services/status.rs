// src/services/status.rs

//! Registration-status classification from detail-page text.

use crate::models::RegistrationStatus;

/// Marker phrases checked in order; the first match wins. Real pages can
/// carry several of these at once, so the ordering is the tie-break.
const OPEN_MARKER: &str = "開放報名";
const FULL_MARKERS: [&str; 2] = ["報名額滿", "額滿"];
const CLOSED_MARKER: &str = "報名截止";
const NOT_YET_OPEN_MARKER: &str = "尚未開放";

/// Classify the visible text of a detail page.
///
/// This only covers the "page was read" cases. [`RegistrationStatus::ReadFailed`]
/// and [`RegistrationStatus::Unspecified`] are assigned by the orchestrator when
/// the page could not be read or was never visited.
pub fn classify(page_text: &str) -> RegistrationStatus {
    if page_text.contains(OPEN_MARKER) {
        RegistrationStatus::OpenForRegistration
    } else if FULL_MARKERS.iter().any(|m| page_text.contains(m)) {
        RegistrationStatus::Full
    } else if page_text.contains(CLOSED_MARKER) {
        RegistrationStatus::Closed
    } else if page_text.contains(NOT_YET_OPEN_MARKER) {
        RegistrationStatus::NotYetOpen
    } else {
        RegistrationStatus::SeeDetails
    }
}
