use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::{LensError, Result};
use crate::pipeline::{Progress, ProgressSink};
use crate::scraper::config::ScraperConfig;
use crate::scraper::session::{ScrapeSession, SessionState};
use crate::scraper::strategy::{default_strategies, run_strategies};
use crate::scraper::{BrowserLauncher, BrowserPage, Locator, ScrollTarget};

/// Drives one browser session from launch to a set of raw review fragments.
pub struct PageExtractor {
    launcher: Arc<dyn BrowserLauncher>,
    config: ScraperConfig,
}

impl PageExtractor {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: ScraperConfig) -> Self {
        Self { launcher, config }
    }

    /// Load `url` and return every distinct candidate fragment, in the order found.
    ///
    /// The browser is closed on every exit path, including cancellation.
    pub async fn extract(
        &self,
        url: &str,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        if cancel.is_cancelled() {
            return Err(LensError::Cancelled);
        }

        progress(Progress::stage("Initializing web driver..."));
        let mut page = self.launcher.launch().await?;
        let mut session = ScrapeSession::new(url);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LensError::Cancelled),
            result = self.drive(&*page, &mut session, progress) => result,
        };

        if let Err(e) = page.quit().await {
            warn!("Failed to close browser: {}", e);
        }

        match outcome {
            Ok(()) => {
                session.advance(SessionState::Done);
                info!(
                    url,
                    fragments = session.fragments.len(),
                    scrolls = session.scrolls,
                    expanded = session.expanded,
                    "Extraction finished"
                );
                Ok(session.into_fragments())
            }
            Err(e) => {
                warn!(url, state = %session.state(), "Extraction failed: {}", e);
                session.fail();
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        page: &dyn BrowserPage,
        session: &mut ScrapeSession,
        progress: &ProgressSink,
    ) -> Result<()> {
        progress(Progress::stage(format!("Loading {}...", session.url)));
        page.navigate(&session.url).await?;
        sleep(self.config.settle_after_load()).await;
        session.advance(SessionState::Loaded);

        if dismiss_consent(page, &self.config.consent()).await {
            sleep(self.config.consent_settle()).await;
        }
        session.advance(SessionState::ConsentHandled);

        progress(Progress::stage("Starting to scroll and collect reviews..."));
        session.scrolls = scroll_until_exhausted(page, &self.config, progress).await;

        progress(Progress::stage("Expanding review texts..."));
        session.expanded = expand_truncated(page, &self.config).await;
        session.advance(SessionState::ContentExpanded);

        progress(Progress::stage("Extracting review content..."));
        let strategies = default_strategies(&self.config);
        run_strategies(
            &strategies,
            page,
            self.config.min_fragments,
            &mut session.fragments,
            progress,
        )
        .await;
        session.advance(SessionState::Extracted);

        if session.fragments.is_empty() {
            return Err(LensError::NoFragments);
        }

        progress(Progress::stage(format!(
            "Found {} potential reviews",
            session.fragments.len()
        )));
        Ok(())
    }
}

/// Click every visible "read more" control, at most `max_expander_clicks`
/// attempts per locator. Returns the number of controls clicked.
async fn expand_truncated(page: &dyn BrowserPage, config: &ScraperConfig) -> usize {
    let mut clicked = 0;
    for locator in config.expanders() {
        for _ in 0..config.max_expander_clicks {
            match page.expand_next(&locator).await {
                Ok(true) => {
                    clicked += 1;
                    sleep(config.expand_settle()).await;
                }
                Ok(false) => break,
                Err(e) => debug!(locator = %locator, "Expander click failed: {}", e),
            }
        }
    }
    clicked
}

/// Click the first visible consent control; true if one was clicked.
async fn dismiss_consent(page: &dyn BrowserPage, locators: &[Locator]) -> bool {
    click_first_visible(page, locators).await.is_some()
}

async fn click_first_visible<'a>(
    page: &dyn BrowserPage,
    locators: &'a [Locator],
) -> Option<&'a Locator> {
    for locator in locators {
        match page.visible_count(locator).await {
            Ok(0) => continue,
            Ok(_) => match page.click_visible(locator, 0).await {
                Ok(true) => {
                    debug!(locator = %locator, "Clicked");
                    return Some(locator);
                }
                Ok(false) => continue,
                Err(e) => debug!(locator = %locator, "Click failed: {}", e),
            },
            Err(e) => debug!(locator = %locator, "Lookup failed: {}", e),
        }
    }
    None
}

async fn height_or(page: &dyn BrowserPage, fallback: u64) -> u64 {
    match page.page_height().await {
        Ok(height) => height,
        Err(e) => {
            debug!("Failed to read page height: {}", e);
            fallback
        }
    }
}

/// Scroll until the page stops growing or `max_scrolls` is reached.
///
/// Each round scrolls to the bottom. When the height is unchanged it clicks
/// a load-more control, then retries once by bouncing to the top and back.
/// A round that still does not grow the page ends the loop. Returns the
/// number of rounds that grew the page.
pub async fn scroll_until_exhausted(
    page: &dyn BrowserPage,
    config: &ScraperConfig,
    progress: &ProgressSink,
) -> usize {
    let load_more = config.load_more();
    let mut last_height = match page.page_height().await {
        Ok(height) => height,
        Err(e) => {
            warn!("Cannot read page height, skipping scroll: {}", e);
            return 0;
        }
    };

    let mut scrolls = 0;
    while scrolls < config.max_scrolls {
        if let Err(e) = page.scroll_to(ScrollTarget::Bottom).await {
            warn!("Scroll failed: {}", e);
            break;
        }
        sleep(config.scroll_pause()).await;

        let mut new_height = height_or(page, last_height).await;
        if new_height == last_height {
            if let Some(locator) = click_first_visible(page, &load_more).await {
                debug!(locator = %locator, "Clicked load more");
                sleep(config.load_more_wait()).await;
                new_height = height_or(page, last_height).await;
            }
        }

        if new_height == last_height {
            let _ = page.scroll_to(ScrollTarget::Top).await;
            sleep(config.retry_top_wait()).await;
            let _ = page.scroll_to(ScrollTarget::Bottom).await;
            sleep(config.retry_bottom_wait()).await;

            new_height = height_or(page, last_height).await;
            if new_height == last_height {
                debug!(scrolls, height = last_height, "Page stopped growing");
                break;
            }
        }

        last_height = new_height;
        scrolls += 1;
        progress(Progress::stage(format!(
            "Scrolling page... ({}/{})",
            scrolls, config.max_scrolls
        )));
    }
    scrolls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::silent;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Height grows by `growth` on every scroll to the bottom while growth remains.
    struct GrowingPage {
        height: AtomicU64,
        growth_left: AtomicUsize,
        load_more_clicks: AtomicUsize,
        scrolls: AtomicUsize,
    }

    impl GrowingPage {
        fn new(growths: usize) -> Self {
            Self {
                height: AtomicU64::new(1000),
                growth_left: AtomicUsize::new(growths),
                load_more_clicks: AtomicUsize::new(0),
                scrolls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BrowserPage for GrowingPage {
        async fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn element_texts(&self, _locator: &Locator) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn visible_count(&self, locator: &Locator) -> Result<usize> {
            Ok(usize::from(locator.query() == "button.more"))
        }
        async fn click_visible(&self, locator: &Locator, _index: usize) -> Result<bool> {
            if locator.query() == "button.more" {
                self.load_more_clicks.fetch_add(1, Ordering::SeqCst);
                return Ok(true);
            }
            Ok(false)
        }
        async fn expand_next(&self, _locator: &Locator) -> Result<bool> {
            Ok(false)
        }
        async fn scroll_to(&self, target: ScrollTarget) -> Result<()> {
            if target == ScrollTarget::Bottom {
                self.scrolls.fetch_add(1, Ordering::SeqCst);
                let left = self.growth_left.load(Ordering::SeqCst);
                if left > 0 {
                    self.growth_left.store(left - 1, Ordering::SeqCst);
                    self.height.fetch_add(500, Ordering::SeqCst);
                }
            }
            Ok(())
        }
        async fn page_height(&self) -> Result<u64> {
            Ok(self.height.load(Ordering::SeqCst))
        }
        async fn body_text(&self) -> Result<String> {
            Ok(String::new())
        }
        async fn quit(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn config(max_scrolls: usize) -> ScraperConfig {
        ScraperConfig {
            max_scrolls,
            load_more_locators: vec!["button.more".into()],
            ..ScraperConfig::default().without_delays()
        }
    }

    #[tokio::test]
    async fn test_scroll_stops_when_height_never_changes() {
        let page = GrowingPage::new(0);
        let scrolls = scroll_until_exhausted(&page, &config(15), &silent()).await;

        assert_eq!(scrolls, 0);
        assert_eq!(page.load_more_clicks.load(Ordering::SeqCst), 1);
        // First bottom scroll plus the top/bottom retry
        assert_eq!(page.scrolls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_scroll_capped_by_max_scrolls() {
        let page = GrowingPage::new(usize::MAX);
        let scrolls = scroll_until_exhausted(&page, &config(4), &silent()).await;

        assert_eq!(scrolls, 4);
        assert_eq!(page.load_more_clicks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scroll_reports_progress() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let collected = events.clone();
        let sink: ProgressSink = Arc::new(move |p| collected.lock().unwrap().push(p));

        let page = GrowingPage::new(2);
        let scrolls = scroll_until_exhausted(&page, &config(10), &sink).await;

        assert_eq!(scrolls, 2);
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&Progress::stage("Scrolling page... (2/10)"))
        );
    }

    /// Review page behind a consent banner, with "read more" controls that
    /// disappear once clicked. Queries listed in `broken` always fail.
    struct ReviewPage {
        broken: Vec<&'static str>,
        consent_clicked_at: Mutex<Option<Instant>>,
        first_scroll_at: Mutex<Option<Instant>>,
        expanded: Mutex<Vec<bool>>,
    }

    impl ReviewPage {
        fn new(expanders: usize, broken: &[&'static str]) -> Self {
            Self {
                broken: broken.to_vec(),
                consent_clicked_at: Mutex::new(None),
                first_scroll_at: Mutex::new(None),
                expanded: Mutex::new(vec![false; expanders]),
            }
        }

        fn check(&self, locator: &Locator) -> Result<()> {
            if self.broken.contains(&locator.query()) {
                return Err(LensError::Browser(format!("cannot evaluate {}", locator)));
            }
            Ok(())
        }

        fn truncated(&self) -> Vec<usize> {
            let expanded = self.expanded.lock().unwrap();
            (0..expanded.len()).filter(|&i| !expanded[i]).collect()
        }

        fn consent_clicked(&self) -> bool {
            self.consent_clicked_at.lock().unwrap().is_some()
        }
    }

    #[async_trait]
    impl BrowserPage for ReviewPage {
        async fn navigate(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn element_texts(&self, locator: &Locator) -> Result<Vec<String>> {
            self.check(locator)?;
            if locator.query() == ".review" {
                return Ok((0..5)
                    .map(|i| format!("Review {} of the kettle: boils fast and pours cleanly.", i))
                    .collect());
            }
            Ok(Vec::new())
        }
        async fn visible_count(&self, locator: &Locator) -> Result<usize> {
            self.check(locator)?;
            Ok(match locator.query() {
                "#accept" => usize::from(!self.consent_clicked()),
                "button.read-more" => self.truncated().len(),
                _ => 0,
            })
        }
        async fn click_visible(&self, locator: &Locator, index: usize) -> Result<bool> {
            self.check(locator)?;
            match locator.query() {
                "#accept" if !self.consent_clicked() && index == 0 => {
                    *self.consent_clicked_at.lock().unwrap() = Some(Instant::now());
                    Ok(true)
                }
                "button.read-more" => match self.truncated().get(index) {
                    Some(&id) => {
                        self.expanded.lock().unwrap()[id] = true;
                        Ok(true)
                    }
                    None => Ok(false),
                },
                _ => Ok(false),
            }
        }
        async fn expand_next(&self, locator: &Locator) -> Result<bool> {
            self.check(locator)?;
            if locator.query() != "button.read-more" {
                return Ok(false);
            }
            match self.truncated().first() {
                Some(&id) => {
                    self.expanded.lock().unwrap()[id] = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        async fn scroll_to(&self, _target: ScrollTarget) -> Result<()> {
            self.first_scroll_at
                .lock()
                .unwrap()
                .get_or_insert_with(Instant::now);
            Ok(())
        }
        async fn page_height(&self) -> Result<u64> {
            Ok(1000)
        }
        async fn body_text(&self) -> Result<String> {
            Ok(String::new())
        }
        async fn quit(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct NoLaunch;

    #[async_trait]
    impl BrowserLauncher for NoLaunch {
        async fn launch(&self) -> Result<Box<dyn BrowserPage>> {
            Err(LensError::Browser("pages are driven directly".into()))
        }
    }

    fn review_config(consent: &[&str], expanders: &[&str]) -> ScraperConfig {
        ScraperConfig {
            consent_locators: consent.iter().map(|q| q.to_string()).collect(),
            load_more_locators: Vec::new(),
            expander_locators: expanders.iter().map(|q| q.to_string()).collect(),
            container_selectors: vec![".review".into()],
            review_text_selectors: Vec::new(),
            ..ScraperConfig::default().without_delays()
        }
    }

    #[tokio::test]
    async fn test_consent_click_waits_before_scrolling() {
        let page = ReviewPage::new(0, &[]);
        let config = ScraperConfig {
            consent_settle_ms: 80,
            ..review_config(&["#accept"], &[])
        };
        let extractor = PageExtractor::new(Arc::new(NoLaunch), config);
        let mut session = ScrapeSession::new("https://shop.example/kettle");

        extractor.drive(&page, &mut session, &silent()).await.unwrap();

        let clicked = page.consent_clicked_at.lock().unwrap().unwrap();
        let scrolled = page.first_scroll_at.lock().unwrap().unwrap();
        assert!(scrolled.duration_since(clicked) >= Duration::from_millis(80));
        assert_eq!(session.state(), SessionState::Extracted);
        assert_eq!(session.fragments.len(), 5);
    }

    #[tokio::test]
    async fn test_consent_lookup_error_is_swallowed() {
        let page = ReviewPage::new(0, &["#broken"]);
        let extractor = PageExtractor::new(Arc::new(NoLaunch), review_config(&["#broken", "#accept"], &[]));
        let mut session = ScrapeSession::new("https://shop.example/kettle");

        extractor.drive(&page, &mut session, &silent()).await.unwrap();
        assert!(page.consent_clicked());

        let page = ReviewPage::new(0, &["#broken"]);
        assert!(!dismiss_consent(&page, &[Locator::parse("#broken")]).await);
    }

    #[tokio::test]
    async fn test_every_vanishing_expander_is_clicked() {
        let page = ReviewPage::new(6, &[]);
        let config = review_config(&[], &["button.read-more"]);

        assert_eq!(expand_truncated(&page, &config).await, 6);
        assert!(page.truncated().is_empty());
    }

    #[tokio::test]
    async fn test_expander_clicks_capped_per_locator() {
        let page = ReviewPage::new(6, &[]);
        let config = ScraperConfig {
            max_expander_clicks: 4,
            ..review_config(&[], &["button.read-more"])
        };

        assert_eq!(expand_truncated(&page, &config).await, 4);
        assert_eq!(page.truncated(), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_expander_failure_is_swallowed() {
        let page = ReviewPage::new(3, &["button.broken"]);
        let config = review_config(&[], &["button.broken", "button.read-more"]);

        assert_eq!(expand_truncated(&page, &config).await, 3);
        assert!(page.truncated().is_empty());
    }

    #[tokio::test]
    async fn test_drive_records_expanded_count() {
        let page = ReviewPage::new(2, &[]);
        let extractor = PageExtractor::new(Arc::new(NoLaunch), review_config(&[], &["button.read-more"]));
        let mut session = ScrapeSession::new("https://shop.example/kettle");

        extractor.drive(&page, &mut session, &silent()).await.unwrap();
        assert_eq!(session.expanded, 2);
    }
}
