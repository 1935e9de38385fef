use std::sync::Arc;

use tracing::debug;

use crate::content::is_non_review_content;
use crate::domain::{ReviewRecord, Sentiment};
use crate::normalizer::{clean_text, normalize_whitespace};
use crate::pipeline::dedup::DedupSet;
use crate::pipeline::PipelineConfig;
use crate::sentiment::SentimentEngine;

/// Turns raw fragments into classified records.
///
/// Cheap to clone; every clone shares the engine and the run's dedup set.
#[derive(Clone)]
pub struct BatchProcessor {
    engine: Arc<SentimentEngine>,
    dedup: Arc<DedupSet>,
    config: PipelineConfig,
    source: Arc<str>,
}

impl BatchProcessor {
    pub fn new(
        engine: Arc<SentimentEngine>,
        dedup: Arc<DedupSet>,
        config: PipelineConfig,
        source: &str,
    ) -> Self {
        Self {
            engine,
            dedup,
            config,
            source: Arc::from(source),
        }
    }

    /// Classify one batch. Neutral and filtered fragments produce no record;
    /// the record keeps the raw fragment text.
    pub async fn process(&self, fragments: &[String]) -> Vec<ReviewRecord> {
        let mut records = Vec::new();

        for fragment in fragments {
            let normalized = normalize_whitespace(fragment);
            if normalized.chars().count() < self.config.min_fragment_chars {
                continue;
            }
            if !self.dedup.claim(&normalized) {
                continue;
            }
            if is_non_review_content(&normalized) {
                continue;
            }

            let cleaned = clean_text(&normalized);
            if cleaned.split_whitespace().count() < self.config.min_review_words {
                continue;
            }

            let verdict = self.engine.get_sentiment(&cleaned).await;
            if verdict.sentiment == Sentiment::Neutral {
                debug!("Dropping neutral fragment");
                continue;
            }

            records.push(ReviewRecord::new(
                fragment.clone(),
                verdict.sentiment,
                verdict.confidence,
                &self.source,
            ));
        }

        records
    }
}
