// src/services/rows.rs

//! Listing-table row parsing.
//!
//! Classifies each `<tr>` of the results table as a header row, a malformed
//! row, or a course row, and extracts the displayed fields from the latter.
//! Pure functions; any shape problem degrades to a discard, never an error.

/// Header rows contain both of these markers. Checked only within the first
/// two rows so a later data row mentioning both words is not misclassified.
const HEADER_MARKERS: (&str, &str) = ("積分", "課程");

/// Number of leading rows eligible for header classification.
const HEADER_ROW_WINDOW: usize = 2;

/// Minimum cell count of a well-formed course row.
const MIN_CELLS: usize = 5;

/// Column layout of the TSHP results table.
const COL_PERIOD: usize = 0;
const COL_TOPIC: usize = 2;
const COL_POINTS: usize = 4;

/// Displayed fields of one course row. The detail link lives in an anchor
/// inside the topic cell and is extracted separately by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCells {
    pub period: String,
    pub topic: String,
    pub points: String,
}

/// Classification of one listing-table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Header row, skip
    Header,
    /// Too few cells or empty required fields, skip
    Malformed,
    /// Well-formed course row
    Course(CourseCells),
}

/// Parse one row given its ordered cell texts and its index in the table.
pub fn parse_row(cells: &[String], index: usize) -> RowOutcome {
    let combined = cells.join(" ");
    if index < HEADER_ROW_WINDOW
        && combined.contains(HEADER_MARKERS.0)
        && combined.contains(HEADER_MARKERS.1)
    {
        return RowOutcome::Header;
    }

    if cells.len() < MIN_CELLS {
        return RowOutcome::Malformed;
    }

    let period = cells[COL_PERIOD].trim().to_string();
    let topic = cells[COL_TOPIC].trim().to_string();
    let points = cells[COL_POINTS].trim().to_string();

    // Records with an empty period or topic never reach the output set.
    if period.is_empty() || topic.is_empty() {
        return RowOutcome::Malformed;
    }

    RowOutcome::Course(CourseCells {
        period,
        topic,
        points,
    })
}
