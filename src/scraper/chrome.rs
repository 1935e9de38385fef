use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{LensError, Result};
use crate::scraper::config::ScraperConfig;
use crate::scraper::{scripts, BrowserLauncher, BrowserPage, Locator, ScrollTarget};

/// Launches a dedicated Chrome process per scrape session
pub struct ChromeLauncher {
    config: ScraperConfig,
}

impl ChromeLauncher {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--disable-popup-blocking")
            .arg("--disable-webgl")
            .arg("--disable-accelerated-2d-canvas")
            .arg("--disable-accelerated-video-decode")
            .arg("--disable-gl-extensions")
            .window_size(self.config.window_width, self.config.window_height)
            .request_timeout(self.config.timeout());

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| LensError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserPage>> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| {
                LensError::Browser(format!(
                    "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                    e
                ))
            })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(LensError::Browser(format!("Failed to create page: {}", e)));
            }
        };

        if let Some(ref ua) = self.config.user_agent {
            if let Err(e) = page.set_user_agent(ua).await {
                warn!("Failed to set user agent: {}", e);
            }
        }

        Ok(Box::new(ChromePage {
            browser,
            page: Some(page),
            handler: Some(handler),
            timeout: self.config.timeout(),
        }))
    }
}

/// One Chrome tab plus the process that owns it.
///
/// Dropping without `quit` still tears the process down.
pub struct ChromePage {
    browser: Browser,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    timeout: std::time::Duration,
}

impl ChromePage {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| LensError::Browser("Page already closed".to_string()))
    }

    async fn eval<T: DeserializeOwned>(&self, script: impl Into<String>) -> Result<T> {
        self.page()?
            .evaluate(script.into())
            .await
            .map_err(|e| LensError::Browser(format!("Script execution failed: {}", e)))?
            .into_value::<T>()
            .map_err(|e| LensError::Browser(format!("Failed to parse result: {:?}", e)))
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let page = self.page()?;
        tokio::time::timeout(self.timeout, page.goto(url))
            .await
            .map_err(|_| {
                LensError::PageLoad(format!(
                    "{} did not load within {}s",
                    url,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| LensError::PageLoad(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn element_texts(&self, locator: &Locator) -> Result<Vec<String>> {
        self.eval(scripts::element_texts(locator)).await
    }

    async fn visible_count(&self, locator: &Locator) -> Result<usize> {
        self.eval(scripts::visible_count(locator)).await
    }

    async fn click_visible(&self, locator: &Locator, index: usize) -> Result<bool> {
        self.eval(scripts::click_visible(locator, index)).await
    }

    async fn expand_next(&self, locator: &Locator) -> Result<bool> {
        self.eval(scripts::expand_next(locator)).await
    }

    async fn scroll_to(&self, target: ScrollTarget) -> Result<()> {
        let _: bool = self.eval(scripts::scroll_to(target)).await?;
        Ok(())
    }

    async fn page_height(&self) -> Result<u64> {
        self.eval(scripts::PAGE_HEIGHT).await
    }

    async fn body_text(&self) -> Result<String> {
        self.eval(scripts::BODY_TEXT).await
    }

    async fn quit(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }

        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!("Failed to wait for browser exit: {}", e);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        closed
            .map(|_| ())
            .map_err(|e| LensError::Browser(format!("Failed to close browser: {}", e)))
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        // Browser's own drop kills the child process
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}
