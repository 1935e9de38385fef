use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use reviewlens::app::{LensError, Result};
use reviewlens::domain::Sentiment;
use reviewlens::normalizer::normalize_whitespace;
use reviewlens::pipeline::{spawn_scrape, Orchestrator, PipelineConfig, Progress, ProgressSink};
use reviewlens::scraper::{
    BrowserLauncher, BrowserPage, Locator, PageExtractor, ScraperConfig, ScrollTarget,
};
use reviewlens::sentiment::{ModelOutput, SentimentConfig, SentimentEngine, SentimentModel};

const URL: &str = "https://shop.example/product/blender/reviews";

/// What the scripted page serves; shared with the test for assertions.
#[derive(Default)]
struct PageScript {
    reviews: Vec<String>,
    fail_navigation: bool,
    hang_navigation: bool,
    quit: AtomicBool,
    scrolls: AtomicUsize,
}

struct ScriptedPage {
    script: Arc<PageScript>,
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        if self.script.hang_navigation {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if self.script.fail_navigation {
            return Err(LensError::PageLoad(format!("{}: net::ERR_NAME_NOT_RESOLVED", url)));
        }
        Ok(())
    }

    async fn element_texts(&self, locator: &Locator) -> Result<Vec<String>> {
        if locator.query() == ".review" {
            return Ok(self.script.reviews.clone());
        }
        Ok(Vec::new())
    }

    async fn visible_count(&self, _locator: &Locator) -> Result<usize> {
        Ok(0)
    }

    async fn click_visible(&self, _locator: &Locator, _index: usize) -> Result<bool> {
        Ok(false)
    }

    async fn expand_next(&self, _locator: &Locator) -> Result<bool> {
        Ok(false)
    }

    async fn scroll_to(&self, _target: ScrollTarget) -> Result<()> {
        self.script.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn page_height(&self) -> Result<u64> {
        // Never grows, so the scroll loop must stop on its own
        Ok(2400)
    }

    async fn body_text(&self) -> Result<String> {
        Ok(String::new())
    }

    async fn quit(&mut self) -> Result<()> {
        self.script.quit.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct ScriptedLauncher {
    script: Arc<PageScript>,
}

#[async_trait]
impl BrowserLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserPage>> {
        Ok(Box::new(ScriptedPage {
            script: self.script.clone(),
        }))
    }
}

/// Undecided on everything, so verdicts come from the phrase rules;
/// fails outright on texts mentioning an outage.
#[derive(Default)]
struct ScriptedModel {
    calls: AtomicUsize,
}

#[async_trait]
impl SentimentModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, text: &str) -> Result<ModelOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("outage") {
            return Err(LensError::Model("ConnectionError: sidecar unreachable".into()));
        }
        Ok(ModelOutput::new("neutral", 0.65))
    }
}

fn positive(i: usize) -> String {
    format!("I love this blender number {}, it crushes ice in seconds and cleans up easily.", i)
}

fn negative(i: usize) -> String {
    format!("Terrible motor on unit {}, it stopped after two days of light use here.", i)
}

fn mixed_page() -> Vec<String> {
    let mut reviews: Vec<String> = (0..6).map(positive).collect();
    // Same review with different spacing; only one may survive
    reviews.push(positive(0).replace(" blender ", "   blender\n"));
    reviews.extend((0..3).map(negative));
    reviews.push("The parcel came on a Tuesday in a plain cardboard box with a receipt.".into());
    reviews.push("The jug is one litre and the lid is blue, sold in a brown carton.".into());
    reviews.push("Model outage text about the blender motor and the jug lid design.".into());
    reviews.push("Copyright © 2024 Example Store Inc. All rights reserved here".into());
    reviews
}

fn scraper_config() -> ScraperConfig {
    ScraperConfig {
        container_selectors: vec![".review".into()],
        review_text_selectors: Vec::new(),
        ..ScraperConfig::default().without_delays()
    }
}

fn orchestrator(script: Arc<PageScript>, model: Arc<ScriptedModel>) -> Orchestrator {
    let extractor = PageExtractor::new(Arc::new(ScriptedLauncher { script }), scraper_config());
    let engine = SentimentEngine::new(model, SentimentConfig::default());
    Orchestrator::new(extractor, Arc::new(engine), PipelineConfig::default())
}

fn recording_sink() -> (ProgressSink, Arc<Mutex<Vec<Progress>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collected = events.clone();
    let sink: ProgressSink = Arc::new(move |p| collected.lock().unwrap().push(p));
    (sink, events)
}

#[tokio::test]
async fn test_scrape_classifies_and_filters() {
    let script = Arc::new(PageScript {
        reviews: mixed_page(),
        ..Default::default()
    });
    let model = Arc::new(ScriptedModel::default());
    let orchestrator = orchestrator(script.clone(), model.clone());
    let (sink, events) = recording_sink();

    let report = orchestrator
        .run(URL, sink, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.fragment_count, 14);
    assert_eq!(report.source, URL);

    let positives = report
        .records
        .iter()
        .filter(|r| r.sentiment == Sentiment::Positive)
        .count();
    let negatives = report
        .records
        .iter()
        .filter(|r| r.sentiment == Sentiment::Negative)
        .count();
    assert_eq!((positives, negatives), (6, 3));
    assert!(report.records.iter().all(|r| r.source == URL));
    assert!(report
        .records
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.confidence)));

    // At most one record per normalized text
    let distinct: HashSet<String> = report
        .records
        .iter()
        .map(|r| normalize_whitespace(&r.text))
        .collect();
    assert_eq!(distinct.len(), report.records.len());

    // Duplicate and copyright fragments never reach the model
    assert_eq!(model.calls.load(Ordering::SeqCst), 12);

    assert!(script.quit.load(Ordering::SeqCst));
    // One bottom scroll plus the top/bottom retry
    assert_eq!(script.scrolls.load(Ordering::SeqCst), 3);

    let events = events.lock().unwrap();
    assert!(events.contains(&Progress::stage("Expanding review texts...")));
    assert_eq!(events.last(), Some(&Progress::Batches { completed: 2, total: 2 }));
}

#[tokio::test]
async fn test_empty_page_yields_no_fragments() {
    let script = Arc::new(PageScript::default());
    let orchestrator = orchestrator(script.clone(), Arc::new(ScriptedModel::default()));
    let (sink, _) = recording_sink();

    let result = orchestrator.run(URL, sink, CancellationToken::new()).await;

    assert!(matches!(result, Err(LensError::NoFragments)));
    assert!(script.quit.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_only_neutral_reviews_yield_no_data() {
    let script = Arc::new(PageScript {
        reviews: vec![
            "The parcel came on a Tuesday in a plain cardboard box with a receipt.".into(),
            "Model outage text about the blender motor and the jug lid design.".into(),
        ],
        ..Default::default()
    });
    let orchestrator = orchestrator(script, Arc::new(ScriptedModel::default()));
    let (sink, _) = recording_sink();

    let result = orchestrator.run(URL, sink, CancellationToken::new()).await;

    assert!(matches!(result, Err(LensError::NoReviewData)));
}

#[tokio::test]
async fn test_navigation_failure_closes_browser() {
    let script = Arc::new(PageScript {
        reviews: mixed_page(),
        fail_navigation: true,
        ..Default::default()
    });
    let model = Arc::new(ScriptedModel::default());
    let orchestrator = orchestrator(script.clone(), model.clone());
    let (sink, _) = recording_sink();

    let result = orchestrator.run(URL, sink, CancellationToken::new()).await;

    assert!(matches!(result, Err(LensError::PageLoad(_))));
    assert!(script.quit.load(Ordering::SeqCst));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_during_extraction_closes_browser() {
    let script = Arc::new(PageScript {
        reviews: mixed_page(),
        hang_navigation: true,
        ..Default::default()
    });
    let orchestrator = orchestrator(script.clone(), Arc::new(ScriptedModel::default()));
    let (sink, _) = recording_sink();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = orchestrator.run(URL, sink, cancel).await;

    assert!(matches!(result, Err(LensError::Cancelled)));
    assert!(script.quit.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_background_scrape_streams_progress() {
    let script = Arc::new(PageScript {
        reviews: mixed_page(),
        ..Default::default()
    });
    let orchestrator = Arc::new(orchestrator(script, Arc::new(ScriptedModel::default())));

    let mut handle = spawn_scrape(orchestrator, URL.to_string());
    let mut events = Vec::new();
    while let Some(event) = handle.next_progress().await {
        events.push(event);
    }
    let report = handle.join().await.unwrap();

    assert_eq!(report.records.len(), 9);
    assert_eq!(events.first(), Some(&Progress::stage("Initializing web driver...")));
    assert!(events
        .iter()
        .any(|e| matches!(e, Progress::Batches { completed: 2, total: 2 })));
}
