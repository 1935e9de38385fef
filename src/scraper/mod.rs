//! Headless-browser review extraction.
//!
//! This module drives one browser tab through a fixed sequence of states and
//! returns the raw text fragments that look like reviews.
//!
//! # Architecture
//!
//! ```text
//! URL → launch → navigate → consent → scroll/paginate → expand
//!     → layered strategies (containers → review text → XPath → body text)
//!     → fragment set
//! ```
//!
//! The extractor only talks to the page through [`BrowserPage`], so every
//! step can run against a scripted page in tests. [`ChromeLauncher`] is the
//! chromiumoxide-backed implementation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reviewlens::scraper::{ChromeLauncher, PageExtractor, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let launcher = Arc::new(ChromeLauncher::new(config.clone()));
//! let extractor = PageExtractor::new(launcher, config);
//!
//! let fragments = extractor.extract(url, &progress, &cancel).await?;
//! ```

mod chrome;
mod config;
mod extractor;
mod scripts;
mod session;
mod strategy;

pub use chrome::{ChromeLauncher, ChromePage};
pub use config::ScraperConfig;
pub use extractor::{scroll_until_exhausted, PageExtractor};
pub use session::{FragmentSet, ScrapeSession, SessionState};
pub use strategy::{
    default_strategies, run_strategies, BodyTextSegmentation, ContainerSearch, DirectTextSearch,
    ExtractionStrategy, XPathFallback,
};

use std::fmt;

use async_trait::async_trait;

use crate::app::Result;

/// How to find elements on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    /// Strings starting with `/` or `(` are XPath, anything else is CSS.
    pub fn parse(query: &str) -> Self {
        let query = query.trim();
        if query.starts_with('/') || query.starts_with('(') {
            Locator::XPath(query.to_string())
        } else {
            Locator::Css(query.to_string())
        }
    }

    pub fn query(&self) -> &str {
        match self {
            Locator::Css(q) | Locator::XPath(q) => q,
        }
    }

    pub fn is_xpath(&self) -> bool {
        matches!(self, Locator::XPath(_))
    }
}

impl From<&str> for Locator {
    fn from(query: &str) -> Self {
        Locator::parse(query)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Bottom,
}

/// The capabilities the extractor needs from one browser tab.
///
/// Only visible elements count for texts, counts and clicks.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Rendered text of every visible element matching `locator`
    async fn element_texts(&self, locator: &Locator) -> Result<Vec<String>>;

    async fn visible_count(&self, locator: &Locator) -> Result<usize>;

    /// Click the `index`-th visible match; `false` when there is no such element
    async fn click_visible(&self, locator: &Locator, index: usize) -> Result<bool>;

    /// Click the first visible match this method has not clicked before;
    /// `false` once every match has been clicked
    async fn expand_next(&self, locator: &Locator) -> Result<bool>;

    async fn scroll_to(&self, target: ScrollTarget) -> Result<()>;

    async fn page_height(&self) -> Result<u64>;

    async fn body_text(&self) -> Result<String>;

    /// Close the tab and the browser process behind it
    async fn quit(&mut self) -> Result<()>;
}

/// Starts a fresh browser session with a single blank tab.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserPage>>;
}
