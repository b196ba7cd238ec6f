// src/pipeline/extract.rs

//! Extraction orchestrator.
//!
//! Drives the page-driver through the TSHP query form, enumerates the result
//! rows, and resolves each course's registration status from its detail page.
//! Detail-page problems degrade to `ReadFailed` for that row only; a fatal
//! error anywhere else still yields the records collected so far.

use std::time::Duration;

use chrono::Local;
use rand::Rng;

use crate::driver::{NodeHandle, PageDriver, PageSession};
use crate::error::Result;
use crate::models::{CourseRecord, RegistrationStatus, ScrapeConfig};
use crate::services::rows::{RowOutcome, parse_row};
use crate::services::status::classify;
use crate::utils::date::DateRange;
use crate::utils::url::{NO_LINK, normalize_detail_link};

/// Ordered lookup strategies for the two date inputs. The first strategy
/// yielding at least two matches wins; the site tags its pickers with the
/// `date` class but plain text inputs are the fallback.
const DATE_FIELD_STRATEGIES: &[&str] = &["input.date", "input[type='text']"];

/// Label text of the best-effort "open for registration" filter.
const FILTER_LABEL_TEXT: &str = "開放報名";

/// Candidates for the query button, matched on their visible text.
const SUBMIT_SELECTOR: &str = "button, input[type='button'], a";
const SUBMIT_TEXT: &str = "查詢";

const ROW_SELECTOR: &str = "table tr";
const CELL_SELECTOR: &str = "td";
const TOPIC_ANCHOR_SELECTOR: &str = "a";

/// Index of the cell carrying the topic anchor.
const TOPIC_CELL: usize = 2;

/// What a run produced, including partial results after a fatal error.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    /// Accepted records, in listing-table order
    pub records: Vec<CourseRecord>,
    /// Table rows encountered
    pub rows_seen: usize,
    /// Header/malformed rows discarded
    pub rows_skipped: usize,
    /// Rows whose detail page could not be read
    pub detail_failures: usize,
    /// Set when the run aborted before finishing enumeration
    pub fatal: Option<String>,
}

/// Orchestrates one extraction run over a page driver.
pub struct CourseExtractor {
    config: ScrapeConfig,
}

impl CourseExtractor {
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }

    /// Run the full extraction.
    ///
    /// Never fails outright: a fatal error is logged, recorded on the
    /// outcome, and whatever was collected up to that point is returned. The
    /// listing session is closed on every path.
    pub async fn run(&self, driver: &dyn PageDriver) -> ExtractOutcome {
        let mut outcome = ExtractOutcome::default();

        let mut listing = match driver.open_page().await {
            Ok(page) => page,
            Err(e) => {
                log::error!("Could not open a browser page: {e}");
                outcome.fatal = Some(e.to_string());
                return outcome;
            }
        };

        if let Err(e) = self.drive(listing.as_mut(), driver, &mut outcome).await {
            log::error!("Extraction aborted: {e}");
            outcome.fatal = Some(e.to_string());
        }

        if let Err(e) = listing.close().await {
            log::warn!("Failed to close listing page: {e}");
        }

        outcome
    }

    /// The happy-path state machine: navigate, fill, submit, enumerate.
    async fn drive(
        &self,
        page: &mut dyn PageSession,
        driver: &dyn PageDriver,
        outcome: &mut ExtractOutcome,
    ) -> Result<()> {
        let url = &self.config.target.listing_url;
        log::info!("Navigating to {url}");
        page.goto(url, Duration::from_secs(self.config.timing.nav_timeout_secs))
            .await?;

        self.fill_date_range(page).await?;
        self.toggle_open_filter(page).await;
        self.submit_query(page).await?;

        // Fixed settle delay for the results table to render. Deliberately
        // not a poll; see the design notes.
        tokio::time::sleep(Duration::from_millis(self.config.timing.settle_ms)).await;

        self.enumerate_rows(page, driver, outcome).await
    }

    /// Fill the search window, or proceed degraded when the inputs are missing.
    async fn fill_date_range(&self, page: &mut dyn PageSession) -> Result<()> {
        let today = Local::now().date_naive();
        let range = DateRange::lookahead(today, self.config.target.lookahead_days);
        log::info!("Query window: {} ~ {}", range.start, range.end);

        let mut fields = Vec::new();
        for strategy in DATE_FIELD_STRATEGIES {
            fields = page.select(strategy).await?;
            if fields.len() >= 2 {
                break;
            }
        }

        if fields.len() < 2 {
            log::warn!("Date inputs not found; querying the site's default range");
            return Ok(());
        }

        page.fill(fields[0], &range.start).await?;
        page.fill(fields[1], &range.end).await?;
        Ok(())
    }

    /// Best-effort: tick the "open for registration" filter if present.
    async fn toggle_open_filter(&self, page: &mut dyn PageSession) {
        match self.find_by_text(page, "label", FILTER_LABEL_TEXT).await {
            Ok(Some(label)) => match page.click(label).await {
                Ok(()) => log::info!("Filter '{FILTER_LABEL_TEXT}' enabled"),
                Err(e) => log::warn!("Could not toggle '{FILTER_LABEL_TEXT}' filter: {e}"),
            },
            Ok(None) => log::info!("No '{FILTER_LABEL_TEXT}' filter found, skipping"),
            Err(e) => log::warn!("Filter lookup failed: {e}"),
        }
    }

    /// Click the query button, falling back to a plain Enter press.
    async fn submit_query(&self, page: &mut dyn PageSession) -> Result<()> {
        match self.find_by_text(page, SUBMIT_SELECTOR, SUBMIT_TEXT).await? {
            Some(button) => {
                log::info!("Submitting query");
                page.click(button).await
            }
            None => {
                log::warn!("No query button found, submitting via Enter");
                page.press_enter().await
            }
        }
    }

    /// First element matching `selector` whose visible text contains `needle`.
    async fn find_by_text(
        &self,
        page: &mut dyn PageSession,
        selector: &str,
        needle: &str,
    ) -> Result<Option<NodeHandle>> {
        for handle in page.select(selector).await? {
            if page.text(handle).await.unwrap_or_default().contains(needle) {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    /// Walk the result rows in document order, strictly sequentially.
    async fn enumerate_rows(
        &self,
        page: &mut dyn PageSession,
        driver: &dyn PageDriver,
        outcome: &mut ExtractOutcome,
    ) -> Result<()> {
        let rows = page.select(ROW_SELECTOR).await?;
        log::info!("Found {} table rows", rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            outcome.rows_seen += 1;

            let cell_handles = page.select_within(row, CELL_SELECTOR).await?;
            let mut cells = Vec::with_capacity(cell_handles.len());
            for cell in &cell_handles {
                cells.push(page.text(*cell).await.unwrap_or_default());
            }

            let course = match parse_row(&cells, index) {
                RowOutcome::Header | RowOutcome::Malformed => {
                    log::debug!("Row {index} skipped");
                    outcome.rows_skipped += 1;
                    continue;
                }
                RowOutcome::Course(course) => course,
            };

            let raw_href = self.topic_link(page, &cell_handles).await;
            let link =
                normalize_detail_link(raw_href.as_deref(), &self.config.target.base_origin);

            log::info!("Course: {}", truncate(&course.topic, 20));

            let reg_status = if link == NO_LINK {
                RegistrationStatus::Unspecified
            } else {
                let status = self.resolve_status(driver, &link).await;
                if status == RegistrationStatus::ReadFailed {
                    outcome.detail_failures += 1;
                }
                status
            };

            outcome.records.push(CourseRecord {
                period: course.period,
                topic: course.topic,
                points: course.points,
                reg_status,
                link,
            });

            self.pace().await;
        }

        Ok(())
    }

    /// Raw href of the anchor inside the topic cell, if any.
    async fn topic_link(
        &self,
        page: &mut dyn PageSession,
        cell_handles: &[NodeHandle],
    ) -> Option<String> {
        let cell = cell_handles.get(TOPIC_CELL)?;
        let anchors = page
            .select_within(*cell, TOPIC_ANCHOR_SELECTOR)
            .await
            .ok()?;
        let anchor = anchors.first()?;
        page.attr(*anchor, "href").await.ok().flatten()
    }

    /// Visit a detail page in its own session and classify its text.
    ///
    /// Every failure along the way maps to `ReadFailed` for this row only,
    /// and the session is closed on all paths.
    async fn resolve_status(&self, driver: &dyn PageDriver, link: &str) -> RegistrationStatus {
        let mut detail = match driver.open_page().await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Could not open detail page {link}: {e}");
                return RegistrationStatus::ReadFailed;
            }
        };

        let timeout = Duration::from_secs(self.config.timing.detail_timeout_secs);
        let status = match self.read_detail(detail.as_mut(), link, timeout).await {
            Ok(text) => classify(&text),
            Err(e) => {
                log::warn!("Detail read failed for {link}: {e}");
                RegistrationStatus::ReadFailed
            }
        };

        if let Err(e) = detail.close().await {
            log::warn!("Failed to close detail page: {e}");
        }

        status
    }

    async fn read_detail(
        &self,
        page: &mut dyn PageSession,
        link: &str,
        timeout: Duration,
    ) -> Result<String> {
        page.goto(link, timeout).await?;
        page.page_text().await
    }

    /// Random inter-row delay so the origin is not hammered.
    async fn pace(&self) {
        let timing = &self.config.timing;
        if timing.pacing_max_ms == 0 {
            return;
        }
        let millis = rand::rng().random_range(timing.pacing_min_ms..=timing.pacing_max_ms);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

/// Truncate to a character count without splitting multi-byte text.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fixture::FixtureDriver;
    use crate::models::TimingConfig;

    const LISTING_URL: &str = "https://fixture.test/listing";

    fn test_config() -> ScrapeConfig {
        let mut config = ScrapeConfig::default();
        config.target.listing_url = LISTING_URL.to_string();
        config.timing = TimingConfig {
            nav_timeout_secs: 1,
            detail_timeout_secs: 1,
            settle_ms: 0,
            pacing_min_ms: 0,
            pacing_max_ms: 0,
        };
        config
    }

    fn listing_page(rows: &str) -> String {
        format!(
            r#"<html><body>
            <form>
                <input class="date" type="text"/>
                <input class="date" type="text"/>
                <label>開放報名</label>
                <button>查詢</button>
            </form>
            <table>{rows}</table>
            </body></html>"#
        )
    }

    const HEADER_ROW: &str =
        "<tr><td>課程期間</td><td>積分用途</td><td>課程主題</td><td>申請單位</td><td>積分</td></tr>";

    fn data_row(period: &str, topic_cell: &str, points: &str) -> String {
        format!(
            "<tr><td>{period}</td><td>繼續教育</td><td>{topic_cell}</td><td>某單位</td><td>{points}</td></tr>"
        )
    }

    fn detail_page(text: &str) -> String {
        format!("<html><body><p>{text}</p></body></html>")
    }

    #[tokio::test]
    async fn test_end_to_end_two_records_in_order() {
        let rows = format!(
            "{HEADER_ROW}{}{}",
            data_row("113/05/01", r#"<a href="/ehc/100">臨床藥學研討會</a>"#, "2"),
            data_row("113/06/01", "無連結課程", "1.5"),
        );
        let driver = FixtureDriver::new()
            .page(LISTING_URL, &listing_page(&rows))
            .page(
                "https://www.tshp.org.tw/ehc/100",
                &detail_page("本課程報名額滿"),
            );

        let outcome = CourseExtractor::new(test_config()).run(&driver).await;

        assert!(outcome.fatal.is_none());
        assert_eq!(outcome.rows_seen, 3);
        assert_eq!(outcome.rows_skipped, 1);
        assert_eq!(outcome.records.len(), 2);

        let first = &outcome.records[0];
        assert_eq!(first.topic, "臨床藥學研討會");
        assert_eq!(first.period, "113/05/01");
        assert_eq!(first.reg_status, RegistrationStatus::Full);
        assert_eq!(first.link, "https://www.tshp.org.tw/ehc/100");

        let second = &outcome.records[1];
        assert_eq!(second.topic, "無連結課程");
        assert_eq!(second.reg_status, RegistrationStatus::Unspecified);
        assert_eq!(second.link, "#");

        // Every session (listing + one detail) was closed again.
        assert_eq!(driver.sessions_opened(), 2);
        assert_eq!(driver.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_form_interactions_happen() {
        let rows = format!(
            "{HEADER_ROW}{}",
            data_row("113/05/01", "某課程", "1"),
        );
        let driver = FixtureDriver::new().page(LISTING_URL, &listing_page(&rows));

        let outcome = CourseExtractor::new(test_config()).run(&driver).await;
        assert_eq!(outcome.records.len(), 1);

        // Both date bounds were typed, filter and query button were clicked.
        assert_eq!(driver.filled().len(), 2);
        let clicked = driver.clicked_texts();
        assert!(clicked.iter().any(|t| t.contains("開放報名")));
        assert!(clicked.iter().any(|t| t.contains("查詢")));
        assert!(!driver.enter_pressed());
    }

    #[tokio::test]
    async fn test_detail_failure_degrades_single_row() {
        let rows = format!(
            "{HEADER_ROW}{}{}{}",
            data_row("113/05/01", r#"<a href="/ehc/1">課程一</a>"#, "1"),
            data_row("113/05/02", r#"<a href="/ehc/2">課程二</a>"#, "1"),
            data_row("113/05/03", r#"<a href="/ehc/3">課程三</a>"#, "1"),
        );
        let driver = FixtureDriver::new()
            .page(LISTING_URL, &listing_page(&rows))
            .page("https://www.tshp.org.tw/ehc/1", &detail_page("開放報名中"))
            .failing_page("https://www.tshp.org.tw/ehc/2")
            .page("https://www.tshp.org.tw/ehc/3", &detail_page("報名截止"));

        let outcome = CourseExtractor::new(test_config()).run(&driver).await;

        assert!(outcome.fatal.is_none());
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(
            outcome.records[0].reg_status,
            RegistrationStatus::OpenForRegistration
        );
        assert_eq!(outcome.records[1].reg_status, RegistrationStatus::ReadFailed);
        assert_eq!(outcome.records[2].reg_status, RegistrationStatus::Closed);
        assert_eq!(outcome.detail_failures, 1);

        // The failed detail session was still closed.
        assert_eq!(driver.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_degraded_page_without_form_controls() {
        let rows = format!("{HEADER_ROW}{}", data_row("113/07/01", "某課程", "3"));
        let bare = format!("<html><body><table>{rows}</table></body></html>");
        let driver = FixtureDriver::new().page(LISTING_URL, &bare);

        let outcome = CourseExtractor::new(test_config()).run(&driver).await;

        // No date inputs and no button: degraded mode plus Enter fallback,
        // but rows are still extracted.
        assert!(outcome.fatal.is_none());
        assert_eq!(outcome.records.len(), 1);
        assert!(driver.filled().is_empty());
        assert!(driver.enter_pressed());
    }

    #[tokio::test]
    async fn test_listing_navigation_failure_is_fatal_but_clean() {
        let driver = FixtureDriver::new().failing_page(LISTING_URL);

        let outcome = CourseExtractor::new(test_config()).run(&driver).await;

        assert!(outcome.fatal.is_some());
        assert!(outcome.records.is_empty());
        assert_eq!(driver.open_sessions(), 0);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("臨床藥學研討會", 3), "臨床藥");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
