// src/driver/chromium.rs

//! Chromium-backed page driver (CDP via chromiumoxide).

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::driver::{NodeHandle, PageDriver, PageSession};
use crate::error::{AppError, Result};
use crate::models::BrowserSettings;

/// Page driver backed by a headless Chromium process.
pub struct ChromiumDriver {
    browser: Browser,
    event_loop: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch a Chromium instance with the given settings.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder
            .arg(format!("--user-agent={}", settings.user_agent))
            .build()
            .map_err(AppError::driver)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;

        // The CDP event stream must be drained for the connection to stay alive.
        let event_loop = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self {
            browser,
            event_loop,
        })
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn open_page(&self) -> Result<Box<dyn PageSession>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        Ok(Box::new(ChromiumPage {
            page,
            nodes: Vec::new(),
        }))
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            log::warn!("Browser close failed: {e}");
        }
        self.event_loop.abort();
        Ok(())
    }
}

/// One Chromium tab plus the element handles resolved in it.
struct ChromiumPage {
    page: Page,
    nodes: Vec<Element>,
}

impl ChromiumPage {
    fn node(&self, handle: NodeHandle) -> Result<&Element> {
        self.nodes
            .get(handle.0 as usize)
            .ok_or_else(|| AppError::driver(format!("stale element handle {}", handle.0)))
    }

    fn register(&mut self, elements: Vec<Element>) -> Vec<NodeHandle> {
        let mut handles = Vec::with_capacity(elements.len());
        for element in elements {
            handles.push(NodeHandle(self.nodes.len() as u64));
            self.nodes.push(element);
        }
        handles
    }
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        // Handles from the previous document are meaningless after navigation.
        self.nodes.clear();

        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| AppError::navigation(url, e))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| AppError::navigation(url, e))?;
            Ok(())
        };

        match tokio::time::timeout(timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(AppError::navigation(url, "navigation timed out")),
        }
    }

    async fn select(&mut self, selector: &str) -> Result<Vec<NodeHandle>> {
        // chromiumoxide reports "no matches" as an error; our surface treats
        // it as an empty result.
        let elements = self.page.find_elements(selector).await.unwrap_or_default();
        Ok(self.register(elements))
    }

    async fn select_within(
        &mut self,
        node: NodeHandle,
        selector: &str,
    ) -> Result<Vec<NodeHandle>> {
        let elements = self
            .node(node)?
            .find_elements(selector)
            .await
            .unwrap_or_default();
        Ok(self.register(elements))
    }

    async fn fill(&mut self, node: NodeHandle, text: &str) -> Result<()> {
        let element = self.node(node)?;
        element
            .click()
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        Ok(())
    }

    async fn click(&mut self, node: NodeHandle) -> Result<()> {
        self.node(node)?
            .click()
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        Ok(())
    }

    async fn text(&mut self, node: NodeHandle) -> Result<String> {
        let text = self
            .node(node)?
            .inner_text()
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn attr(&mut self, node: NodeHandle, name: &str) -> Result<Option<String>> {
        self.node(node)?
            .attribute(name)
            .await
            .map_err(|e| AppError::driver(e.to_string()))
    }

    async fn page_text(&mut self) -> Result<String> {
        let body = self
            .page
            .find_element("body")
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        let text = body
            .inner_text()
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn press_enter(&mut self) -> Result<()> {
        let body = self
            .page
            .find_element("body")
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        body.press_key("Enter")
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.nodes.clear();
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| AppError::driver(e.to_string()))?;
        Ok(())
    }
}
