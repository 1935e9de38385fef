use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::scraper::Locator;

/// Configuration for the review extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Browser window size (default: 1366x768)
    pub window_width: u32,
    pub window_height: u32,

    /// Page load timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Wait after the initial load for dynamic content (default: 5000)
    pub settle_after_load_ms: u64,

    /// Wait after dismissing a consent banner (default: 2000)
    pub consent_settle_ms: u64,

    /// Wait after each scroll to the bottom (default: 2500)
    pub scroll_pause_ms: u64,

    /// Wait after clicking a load-more control (default: 3000)
    pub load_more_wait_ms: u64,

    /// Waits for the top/bottom retry when the page stops growing
    pub retry_top_wait_ms: u64,
    pub retry_bottom_wait_ms: u64,

    /// Wait after each expander click (default: 500)
    pub expand_settle_ms: u64,

    /// Upper bound on scroll iterations (default: 15)
    pub max_scrolls: usize,

    /// Upper bound on expander clicks per locator (default: 50)
    pub max_expander_clicks: usize,

    /// Fallback strategies run while fewer fragments than this were found (default: 5)
    pub min_fragments: usize,

    /// Cookie/consent accept buttons, tried in order until one is clicked
    pub consent_locators: Vec<String>,

    /// "Load more" controls, tried in order when the page stops growing
    pub load_more_locators: Vec<String>,

    /// "Read more" controls that expand truncated reviews
    pub expander_locators: Vec<String>,

    /// Review card selectors for the container search
    pub container_selectors: Vec<String>,

    /// Review body selectors for the direct text search
    pub review_text_selectors: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            window_width: 1366,
            window_height: 768,
            timeout_secs: 30,
            settle_after_load_ms: 5000,
            consent_settle_ms: 2000,
            scroll_pause_ms: 2500,
            load_more_wait_ms: 3000,
            retry_top_wait_ms: 1000,
            retry_bottom_wait_ms: 2000,
            expand_settle_ms: 500,
            max_scrolls: 15,
            max_expander_clicks: 50,
            min_fragments: 5,
            consent_locators: strings(&[
                "//*[contains(text(), 'Accept')]",
                "//*[contains(text(), 'I agree')]",
                "//*[contains(text(), 'Allow')]",
                "//*[contains(text(), 'Got it')]",
                "//*[contains(text(), 'OK')]",
                "#onetrust-accept-btn-handler",
                "button[id*='accept']",
                "button[id*='agree']",
                "form[action*='consent'] button",
            ]),
            load_more_locators: strings(&[
                "//button[contains(text(), 'Show More')]",
                "//button[contains(text(), 'Load More')]",
                "//button[contains(text(), 'More Reviews')]",
                "//button[contains(text(), 'View More')]",
                "//a[contains(text(), 'Show More')]",
                "//a[contains(text(), 'Load More')]",
                "button[class*='more']",
                "button[class*='load']",
                "a[class*='more']",
                "a[class*='load']",
            ]),
            expander_locators: strings(&[
                "//button[contains(text(), 'Read More')]",
                "//span[contains(text(), 'Read More')]",
                "//a[contains(text(), 'Read More')]",
                "//button[contains(text(), '... More')]",
                "//span[contains(text(), '... More')]",
                "//button[contains(text(), 'Show Full Review')]",
                "//button[contains(text(), 'See More')]",
                "button[class*='expand']",
                "button[class*='more']",
                "button[aria-label*='expand']",
            ]),
            container_selectors: strings(&[
                "div[class*='review']",
                "div[class*='Review']",
                "article[class*='review']",
                "div[data-testid*='review']",
                "div[class*='comment']",
                "div[class*='feedback']",
                "div[class*='testimonial']",
                "li[class*='review']",
                "section[class*='review']",
                "div[itemprop='review']",
            ]),
            review_text_selectors: strings(&[
                "p[class*='review-text']",
                "p[class*='review-content']",
                "div[class*='review-text']",
                "div[class*='review-content']",
                "div[class*='review-body']",
                "span[class*='review-text']",
                "p[data-service-review-text-typography]",
                "[data-testid*='review-text']",
                "[itemprop='reviewBody']",
                "[class*='comment-text']",
            ]),
        }
    }
}

impl ScraperConfig {
    /// Get the page load timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle_after_load(&self) -> Duration {
        Duration::from_millis(self.settle_after_load_ms)
    }

    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn load_more_wait(&self) -> Duration {
        Duration::from_millis(self.load_more_wait_ms)
    }

    pub fn retry_top_wait(&self) -> Duration {
        Duration::from_millis(self.retry_top_wait_ms)
    }

    pub fn retry_bottom_wait(&self) -> Duration {
        Duration::from_millis(self.retry_bottom_wait_ms)
    }

    pub fn expand_settle(&self) -> Duration {
        Duration::from_millis(self.expand_settle_ms)
    }

    pub fn consent(&self) -> Vec<Locator> {
        parse_all(&self.consent_locators)
    }

    pub fn load_more(&self) -> Vec<Locator> {
        parse_all(&self.load_more_locators)
    }

    pub fn expanders(&self) -> Vec<Locator> {
        parse_all(&self.expander_locators)
    }

    /// Create a config optimized for speed (fewer scrolls, shorter waits)
    pub fn fast() -> Self {
        Self {
            timeout_secs: 15,
            settle_after_load_ms: 2000,
            scroll_pause_ms: 1000,
            load_more_wait_ms: 1500,
            max_scrolls: 5,
            ..Default::default()
        }
    }

    /// Create a config optimized for coverage (slower)
    pub fn thorough() -> Self {
        Self {
            timeout_secs: 60,
            settle_after_load_ms: 8000,
            scroll_pause_ms: 3500,
            load_more_wait_ms: 4000,
            max_scrolls: 40,
            max_expander_clicks: 200,
            ..Default::default()
        }
    }

    /// Drop every settle delay; for pre-rendered pages and scripted test pages
    pub fn without_delays(self) -> Self {
        Self {
            settle_after_load_ms: 0,
            consent_settle_ms: 0,
            scroll_pause_ms: 0,
            load_more_wait_ms: 0,
            retry_top_wait_ms: 0,
            retry_bottom_wait_ms: 0,
            expand_settle_ms: 0,
            ..self
        }
    }
}

fn parse_all(queries: &[String]) -> Vec<Locator> {
    queries
        .iter()
        .filter(|q| !q.trim().is_empty())
        .map(|q| Locator::parse(q))
        .collect()
}
