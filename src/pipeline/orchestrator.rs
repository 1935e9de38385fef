use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::app::{LensError, Result};
use crate::config::Config;
use crate::domain::ReviewRecord;
use crate::pipeline::batch::BatchProcessor;
use crate::pipeline::dedup::DedupSet;
use crate::pipeline::{PipelineConfig, Progress, ProgressSink};
use crate::scraper::{BrowserLauncher, ChromeLauncher, PageExtractor};
use crate::sentiment::SentimentEngine;

/// What one successful scrape produced.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub source: String,
    pub fragment_count: usize,
    pub records: Vec<ReviewRecord>,
}

/// Runs extraction, then classifies the fragments on a bounded worker pool.
pub struct Orchestrator {
    extractor: PageExtractor,
    engine: Arc<SentimentEngine>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(extractor: PageExtractor, engine: Arc<SentimentEngine>, config: PipelineConfig) -> Self {
        Self {
            extractor,
            engine,
            config,
        }
    }

    /// Load the sentiment model, then wire up a Chrome-backed extractor.
    ///
    /// Model loading comes first so a missing model fails before any
    /// browser is launched.
    pub async fn start(config: &Config) -> Result<Self> {
        let engine = SentimentEngine::load(config.sentiment.clone()).await?;
        info!("Sentiment model loaded: {}", engine.model_name());

        let launcher: Arc<dyn BrowserLauncher> = Arc::new(ChromeLauncher::new(config.scraper.clone()));
        let extractor = PageExtractor::new(launcher, config.scraper.clone());
        Ok(Self::new(extractor, Arc::new(engine), config.pipeline.clone()))
    }

    pub fn engine(&self) -> &SentimentEngine {
        &self.engine
    }

    pub async fn run(
        &self,
        url: &str,
        progress: ProgressSink,
        cancel: CancellationToken,
    ) -> Result<ScrapeReport> {
        let parsed = url::Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LensError::Config(format!("Unsupported URL scheme: {}", parsed.scheme())));
        }

        let fragments = self.extractor.extract(url, &progress, &cancel).await?;
        if fragments.is_empty() {
            return Err(LensError::NoFragments);
        }
        let fragment_count = fragments.len();

        progress(Progress::stage(format!("Analyzing {} reviews...", fragment_count)));
        let records = self.classify(fragments, url, &progress, &cancel).await?;
        if records.is_empty() {
            return Err(LensError::NoReviewData);
        }

        info!(url, fragment_count, records = records.len(), "Scrape finished");
        Ok(ScrapeReport {
            source: url.to_string(),
            fragment_count,
            records,
        })
    }

    /// Split `fragments` into batches and classify them concurrently.
    ///
    /// Records come back in batch completion order. A batch whose task
    /// fails is logged and skipped.
    pub async fn classify(
        &self,
        fragments: Vec<String>,
        source: &str,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReviewRecord>> {
        let batches: Vec<Vec<String>> = fragments
            .chunks(self.config.batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let total = batches.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.config.max_workers.min(total).max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let processor = BatchProcessor::new(
            self.engine.clone(),
            Arc::new(DedupSet::new()),
            self.config.clone(),
            source,
        );

        let mut tasks = JoinSet::new();
        for batch in batches {
            let semaphore = semaphore.clone();
            let processor = processor.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| LensError::Other(format!("Worker pool closed: {}", e)))?;
                Ok::<_, LensError>(processor.process(&batch).await)
            });
        }

        progress(Progress::Batches { completed: 0, total });

        let mut records = Vec::new();
        let mut completed = 0;
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(LensError::Cancelled);
                }
                next = tasks.join_next() => next,
            };
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok(Ok(batch_records)) => records.extend(batch_records),
                Ok(Err(e)) => error!("Batch processing failed: {}", e),
                Err(e) => error!("Batch task failed: {}", e),
            }

            completed += 1;
            progress(Progress::Batches { completed, total });
        }

        Ok(records)
    }
}
