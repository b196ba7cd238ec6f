// src/utils/url.rs

//! Detail-page link normalization.

/// Sentinel link meaning "this row has no detail page".
pub const NO_LINK: &str = "#";

/// Normalize a raw anchor href into an absolute detail-page URL.
///
/// Missing hrefs map to the [`NO_LINK`] sentinel, absolute URLs pass through
/// unchanged, and site-relative paths are prefixed with the base origin.
///
/// # Examples
/// ```
/// use tshp_scraper::utils::normalize_detail_link;
///
/// assert_eq!(normalize_detail_link(None, "https://www.tshp.org.tw"), "#");
/// assert_eq!(
///     normalize_detail_link(Some("/ehc/abc"), "https://www.tshp.org.tw"),
///     "https://www.tshp.org.tw/ehc/abc"
/// );
/// ```
pub fn normalize_detail_link(href: Option<&str>, base_origin: &str) -> String {
    match href {
        None => NO_LINK.to_string(),
        Some(href) if href.starts_with("http") => href.to_string(),
        Some(href) => format!("{}{}", base_origin.trim_end_matches('/'), href),
    }
}
