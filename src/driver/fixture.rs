// src/driver/fixture.rs

//! In-process page driver serving canned HTML documents, for tests.
//!
//! Element handles are resolution paths (selector + match index per step)
//! replayed against a freshly parsed document on every call, so no DOM state
//! is held across awaits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::driver::{NodeHandle, PageDriver, PageSession};
use crate::error::{AppError, Result};

/// What `goto` should do for a registered URL.
enum PageBehavior {
    Html(String),
    FailNavigation,
}

#[derive(Default)]
struct FixtureState {
    pages: HashMap<String, PageBehavior>,
    open_sessions: usize,
    sessions_opened: usize,
    enter_pressed: bool,
    filled: Vec<String>,
    clicked_texts: Vec<String>,
}

/// Test driver; every opened session shares the same registered site.
#[derive(Default)]
pub(crate) struct FixtureDriver {
    state: Arc<Mutex<FixtureState>>,
}

impl FixtureDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a URL that serves the given HTML.
    pub fn page(self, url: &str, html: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), PageBehavior::Html(html.to_string()));
        self
    }

    /// Register a URL whose navigation always fails.
    pub fn failing_page(self, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), PageBehavior::FailNavigation);
        self
    }

    pub fn open_sessions(&self) -> usize {
        self.state.lock().unwrap().open_sessions
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.lock().unwrap().sessions_opened
    }

    pub fn enter_pressed(&self) -> bool {
        self.state.lock().unwrap().enter_pressed
    }

    pub fn filled(&self) -> Vec<String> {
        self.state.lock().unwrap().filled.clone()
    }

    pub fn clicked_texts(&self) -> Vec<String> {
        self.state.lock().unwrap().clicked_texts.clone()
    }
}

#[async_trait]
impl PageDriver for FixtureDriver {
    async fn open_page(&self) -> Result<Box<dyn PageSession>> {
        let mut state = self.state.lock().unwrap();
        state.open_sessions += 1;
        state.sessions_opened += 1;
        drop(state);

        Ok(Box::new(FixturePage {
            state: Arc::clone(&self.state),
            html: None,
            paths: Vec::new(),
            closed: false,
        }))
    }

    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One resolution step: selector plus index among its matches.
type Path = Vec<(String, usize)>;

struct FixturePage {
    state: Arc<Mutex<FixtureState>>,
    html: Option<String>,
    paths: Vec<Path>,
    closed: bool,
}

impl FixturePage {
    fn document(&self) -> Result<Html> {
        let html = self
            .html
            .as_ref()
            .ok_or_else(|| AppError::driver("fixture page has no document loaded"))?;
        Ok(Html::parse_document(html))
    }

    fn path(&self, handle: NodeHandle) -> Result<&Path> {
        self.paths
            .get(handle.0 as usize)
            .ok_or_else(|| AppError::driver(format!("stale element handle {}", handle.0)))
    }

    fn push_paths(&mut self, paths: Vec<Path>) -> Vec<NodeHandle> {
        let mut handles = Vec::with_capacity(paths.len());
        for path in paths {
            handles.push(NodeHandle(self.paths.len() as u64));
            self.paths.push(path);
        }
        handles
    }

    fn matches_under(doc: &Html, base: &Path, selector: &str) -> Result<Vec<Path>> {
        let parsed =
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;

        let count = match resolve(doc, base)? {
            Some(el) => el.select(&parsed).count(),
            None if base.is_empty() => doc.select(&parsed).count(),
            None => 0,
        };

        Ok((0..count)
            .map(|i| {
                let mut path = base.clone();
                path.push((selector.to_string(), i));
                path
            })
            .collect())
    }

    fn with_element<T>(
        &self,
        handle: NodeHandle,
        f: impl FnOnce(scraper::ElementRef<'_>) -> T,
    ) -> Result<T> {
        let doc = self.document()?;
        let path = self.path(handle)?;
        match resolve(&doc, path)? {
            Some(el) => Ok(f(el)),
            None => Err(AppError::driver(format!(
                "element path no longer resolves: {path:?}"
            ))),
        }
    }
}

/// Replay a resolution path against a parsed document.
fn resolve<'a>(doc: &'a Html, path: &Path) -> Result<Option<scraper::ElementRef<'a>>> {
    let mut current: Option<scraper::ElementRef<'a>> = None;
    for (selector, index) in path {
        let parsed =
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        current = match current {
            None => doc.select(&parsed).nth(*index),
            Some(el) => el.select(&parsed).nth(*index),
        };
        if current.is_none() {
            return Ok(None);
        }
    }
    Ok(current)
}

#[async_trait]
impl PageSession for FixturePage {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.paths.clear();
        let state = self.state.lock().unwrap();
        match state.pages.get(url) {
            Some(PageBehavior::Html(html)) => {
                self.html = Some(html.clone());
                Ok(())
            }
            Some(PageBehavior::FailNavigation) => {
                Err(AppError::navigation(url, "fixture navigation failure"))
            }
            None => Err(AppError::navigation(url, "no fixture page registered")),
        }
    }

    async fn select(&mut self, selector: &str) -> Result<Vec<NodeHandle>> {
        let doc = self.document()?;
        let paths = Self::matches_under(&doc, &Vec::new(), selector)?;
        Ok(self.push_paths(paths))
    }

    async fn select_within(
        &mut self,
        node: NodeHandle,
        selector: &str,
    ) -> Result<Vec<NodeHandle>> {
        let doc = self.document()?;
        let base = self.path(node)?.clone();
        let paths = Self::matches_under(&doc, &base, selector)?;
        Ok(self.push_paths(paths))
    }

    async fn fill(&mut self, node: NodeHandle, text: &str) -> Result<()> {
        self.path(node)?;
        self.state.lock().unwrap().filled.push(text.to_string());
        Ok(())
    }

    async fn click(&mut self, node: NodeHandle) -> Result<()> {
        let text = self.with_element(node, |el| el.text().collect::<String>())?;
        self.state
            .lock()
            .unwrap()
            .clicked_texts
            .push(text.trim().to_string());
        Ok(())
    }

    async fn text(&mut self, node: NodeHandle) -> Result<String> {
        self.with_element(node, |el| el.text().collect::<String>())
    }

    async fn attr(&mut self, node: NodeHandle, name: &str) -> Result<Option<String>> {
        self.with_element(node, |el| el.value().attr(name).map(str::to_string))
    }

    async fn page_text(&mut self) -> Result<String> {
        let doc = self.document()?;
        Ok(doc.root_element().text().collect::<String>())
    }

    async fn press_enter(&mut self) -> Result<()> {
        self.state.lock().unwrap().enter_pressed = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.state.lock().unwrap().open_sessions -= 1;
        }
        Ok(())
    }
}
