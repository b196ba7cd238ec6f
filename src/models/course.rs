//! Course record and registration status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Registration status of a course, resolved from its detail page.
///
/// Serializes as the site's visible Chinese status strings, which is the wire
/// format consumers of the snapshot already expect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Detail page says registration is open
    #[serde(rename = "開放報名")]
    OpenForRegistration,

    /// Detail page says registration or seats are full
    #[serde(rename = "報名額滿")]
    Full,

    /// Detail page says registration has closed
    #[serde(rename = "報名截止")]
    Closed,

    /// Detail page says registration has not opened yet
    #[serde(rename = "尚未開放")]
    NotYetOpen,

    /// Detail page was read but carried no recognizable status text
    #[serde(rename = "請查看詳情")]
    SeeDetails,

    /// Detail page could not be opened or read
    #[serde(rename = "讀取失敗")]
    ReadFailed,

    /// Row had no detail link, so no page was visited
    #[serde(rename = "未標明")]
    Unspecified,
}

impl RegistrationStatus {
    /// The site-facing status string (same text the snapshot serializes).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenForRegistration => "開放報名",
            Self::Full => "報名額滿",
            Self::Closed => "報名截止",
            Self::NotYetOpen => "尚未開放",
            Self::SeeDetails => "請查看詳情",
            Self::ReadFailed => "讀取失敗",
            Self::Unspecified => "未標明",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One course extracted from the listing table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseRecord {
    /// Course date range, as displayed (free text)
    pub period: String,

    /// Course title
    pub topic: String,

    /// Credit points as displayed (site format is inconsistent, kept as text)
    pub points: String,

    /// Resolved registration status
    pub reg_status: RegistrationStatus,

    /// Absolute detail-page URL, or `"#"` when the row had no link
    pub link: String,
}
