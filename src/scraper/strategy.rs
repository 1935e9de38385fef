use async_trait::async_trait;
use tracing::{debug, warn};

use crate::content::is_non_review_content;
use crate::normalizer::normalize_whitespace;
use crate::pipeline::{Progress, ProgressSink};
use crate::scraper::config::ScraperConfig;
use crate::scraper::session::FragmentSet;
use crate::scraper::{BrowserPage, Locator};

/// Minimum length of a container or review-body text
const MIN_ELEMENT_CHARS: usize = 30;

const PARAGRAPH_CHARS: (usize, usize) = (50, 3000);
const LEAF_DIV_CHARS: (usize, usize) = (50, 2000);
const MIN_SENTENCE_WORDS: usize = 10;
const BODY_SEGMENT_CHARS: (usize, usize) = (50, 1000);

/// One way of pulling candidate review text out of a page.
///
/// Strategies never fail; selectors that error are skipped with a warning.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn collect(&self, page: &dyn BrowserPage) -> Vec<String>;
}

async fn texts_or_empty(page: &dyn BrowserPage, locator: &Locator, strategy: &str) -> Vec<String> {
    match page.element_texts(locator).await {
        Ok(texts) => texts,
        Err(e) => {
            warn!(strategy, locator = %locator, "Selector failed: {}", e);
            Vec::new()
        }
    }
}

/// Rendered text of review-card containers
pub struct ContainerSearch {
    selectors: Vec<Locator>,
}

impl ContainerSearch {
    pub fn new(selectors: Vec<Locator>) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ExtractionStrategy for ContainerSearch {
    fn name(&self) -> &'static str {
        "container search"
    }

    async fn collect(&self, page: &dyn BrowserPage) -> Vec<String> {
        let mut found = Vec::new();
        for locator in &self.selectors {
            for text in texts_or_empty(page, locator, self.name()).await {
                let text = text.trim();
                if text.chars().count() > MIN_ELEMENT_CHARS {
                    found.push(text.to_string());
                }
            }
        }
        found
    }
}

/// Review-body elements, normalized and filtered
pub struct DirectTextSearch {
    selectors: Vec<Locator>,
}

impl DirectTextSearch {
    pub fn new(selectors: Vec<Locator>) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl ExtractionStrategy for DirectTextSearch {
    fn name(&self) -> &'static str {
        "direct text search"
    }

    async fn collect(&self, page: &dyn BrowserPage) -> Vec<String> {
        let mut found = Vec::new();
        for locator in &self.selectors {
            for text in texts_or_empty(page, locator, self.name()).await {
                let text = normalize_whitespace(&text);
                if text.chars().count() > MIN_ELEMENT_CHARS && !is_non_review_content(&text) {
                    found.push(text);
                }
            }
        }
        found
    }
}

/// Sentence-like paragraphs and leaf divs found by structural XPath
pub struct XPathFallback {
    queries: Vec<(Locator, (usize, usize))>,
}

impl Default for XPathFallback {
    fn default() -> Self {
        Self {
            queries: vec![
                (Locator::parse("//p[string-length() > 50]"), PARAGRAPH_CHARS),
                (
                    Locator::parse("//div[string-length() > 100 and not(.//div)]"),
                    LEAF_DIV_CHARS,
                ),
            ],
        }
    }
}

fn looks_like_prose(text: &str, (min, max): (usize, usize)) -> bool {
    let len = text.chars().count();
    len > min
        && len < max
        && text.contains('.')
        && text.split_whitespace().count() > MIN_SENTENCE_WORDS
        && !is_non_review_content(text)
}

#[async_trait]
impl ExtractionStrategy for XPathFallback {
    fn name(&self) -> &'static str {
        "XPath fallback"
    }

    async fn collect(&self, page: &dyn BrowserPage) -> Vec<String> {
        let mut found = Vec::new();
        for (locator, band) in &self.queries {
            for text in texts_or_empty(page, locator, self.name()).await {
                let text = normalize_whitespace(&text);
                if looks_like_prose(&text, *band) {
                    found.push(text);
                }
            }
        }
        found
    }
}

/// Last resort: split the whole body text into lines
#[derive(Default)]
pub struct BodyTextSegmentation;

#[async_trait]
impl ExtractionStrategy for BodyTextSegmentation {
    fn name(&self) -> &'static str {
        "body text segmentation"
    }

    async fn collect(&self, page: &dyn BrowserPage) -> Vec<String> {
        let body = match page.body_text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(strategy = self.name(), "Failed to read body text: {}", e);
                return Vec::new();
            }
        };

        let (min, max) = BODY_SEGMENT_CHARS;
        body.lines()
            .map(normalize_whitespace)
            .filter(|segment| {
                let len = segment.chars().count();
                len > min && len < max && !is_non_review_content(segment)
            })
            .collect()
    }
}

/// The four layers in the order they run
pub fn default_strategies(config: &ScraperConfig) -> Vec<Box<dyn ExtractionStrategy>> {
    let parse = |queries: &[String]| -> Vec<Locator> {
        queries.iter().map(|q| Locator::parse(q)).collect()
    };
    vec![
        Box::new(ContainerSearch::new(parse(&config.container_selectors))),
        Box::new(DirectTextSearch::new(parse(&config.review_text_selectors))),
        Box::new(XPathFallback::default()),
        Box::new(BodyTextSegmentation),
    ]
}

/// Runs the first strategy unconditionally and each later one only while
/// fewer than `min_fragments` have been collected.
pub async fn run_strategies(
    strategies: &[Box<dyn ExtractionStrategy>],
    page: &dyn BrowserPage,
    min_fragments: usize,
    fragments: &mut FragmentSet,
    progress: &ProgressSink,
) {
    for (i, strategy) in strategies.iter().enumerate() {
        if i > 0 && fragments.len() >= min_fragments {
            break;
        }
        if i > 0 {
            progress(Progress::stage(format!(
                "Only {} fragments so far, trying {}...",
                fragments.len(),
                strategy.name()
            )));
        }

        let added = fragments.extend(strategy.collect(page).await);
        debug!(strategy = strategy.name(), added, total = fragments.len(), "Strategy finished");
    }
}
