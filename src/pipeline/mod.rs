//! From URL to classified records.
//!
//! The [`Orchestrator`] runs the page extractor, splits the fragments into
//! fixed-size batches and classifies them on a bounded worker pool. Every
//! batch shares one [`DedupSet`], so each distinct normalized text is
//! classified at most once per run.

pub mod background;
pub mod batch;
pub mod dedup;
pub mod orchestrator;
pub mod progress;

use serde::{Deserialize, Serialize};

pub use background::{spawn_scrape, ScrapeHandle};
pub use batch::BatchProcessor;
pub use dedup::DedupSet;
pub use orchestrator::{Orchestrator, ScrapeReport};
pub use progress::{Progress, ProgressSink};

/// Configuration for batching and classification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fragments per classification batch (default: 7)
    pub batch_size: usize,

    /// Upper bound on concurrent batches (default: 4)
    pub max_workers: usize,

    /// Fragments shorter than this, after whitespace normalization, are skipped (default: 20)
    pub min_fragment_chars: usize,

    /// Cleaned texts with fewer words are skipped (default: 5)
    pub min_review_words: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 7,
            max_workers: 4,
            min_fragment_chars: 20,
            min_review_words: 5,
        }
    }
}
