// src/driver/mod.rs

//! Page-driver capability consumed by the extraction pipeline.
//!
//! The orchestrator never talks to a browser engine directly. It drives a
//! [`PageDriver`] that can open isolated page sessions, and a [`PageSession`]
//! that exposes navigation, element lookup, and text/attribute reads. The
//! chromium implementation lives behind the `browser` feature; tests use an
//! in-process DOM fixture.

#[cfg(feature = "browser")]
pub mod chromium;

#[cfg(test)]
pub(crate) mod fixture;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver;

/// Opaque handle to an element located in a page session.
///
/// Handles are only meaningful within the session that produced them and are
/// invalidated by the next navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

/// A browser capable of opening isolated page sessions.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Open a fresh page session (a new tab/browsing context).
    async fn open_page(&self) -> Result<Box<dyn PageSession>>;

    /// Tear down the underlying browser. Called once, unconditionally, at the
    /// end of a run.
    async fn shutdown(&mut self) -> Result<()>;
}

/// One open page (tab) of the driven browser.
///
/// Rows are processed on a single logical flow of control, so a session is
/// only ever used from one task at a time.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to `url`, bounded by `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Locate all elements matching a CSS selector, in document order.
    /// Matching nothing yields an empty Vec, not an error.
    async fn select(&mut self, selector: &str) -> Result<Vec<NodeHandle>>;

    /// Locate elements matching `selector` beneath `node`.
    async fn select_within(&mut self, node: NodeHandle, selector: &str)
    -> Result<Vec<NodeHandle>>;

    /// Type `text` into an input element.
    async fn fill(&mut self, node: NodeHandle, text: &str) -> Result<()>;

    /// Click an element.
    async fn click(&mut self, node: NodeHandle) -> Result<()>;

    /// Visible text of an element.
    async fn text(&mut self, node: NodeHandle) -> Result<String>;

    /// Attribute value of an element, if present.
    async fn attr(&mut self, node: NodeHandle, name: &str) -> Result<Option<String>>;

    /// Visible text of the whole page body.
    async fn page_text(&mut self) -> Result<String>;

    /// Press Enter on the page (generic form submission fallback).
    async fn press_enter(&mut self) -> Result<()>;

    /// Close this page. Must be called on every exit path so open sessions
    /// stay bounded at O(1).
    async fn close(&mut self) -> Result<()>;
}
