//! Abstractive summaries of the reviews of one sentiment.
//!
//! Review texts are concatenated, cut down to what the summarization model
//! accepts and sent to the first summarizer that comes up. The answer is
//! wrapped for plain-text output.

pub mod http;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app::{LensError, Result};
use crate::domain::{ReviewRecord, Sentiment};
use crate::summary::http::HttpSummarizer;

/// Shortest trimmed input the model is worth calling for.
const MIN_MODEL_INPUT_CHARS: usize = 50;

/// Hard bounds on the requested summary length, in tokens.
const LONGEST_SUMMARY: usize = 150;
const SHORTEST_MAX_LENGTH: usize = 50;
const LONGEST_MIN_LENGTH: usize = 30;
const MODEL_MIN_LENGTH_CAP: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Summarizers tried in order until one answers
    pub providers: Vec<SummarizerProvider>,

    /// Only the first this many matching reviews are summarized
    pub max_reviews: usize,

    /// Refuse to summarize less combined text than this
    pub min_combined_chars: usize,

    /// Longest input handed to the model
    pub max_input_chars: usize,

    /// Column width of the written summary
    pub wrap_width: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            max_reviews: 50,
            min_combined_chars: 100,
            max_input_chars: 1024,
            wrap_width: 80,
        }
    }
}

/// Token bounds passed to the summarization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLength {
    pub max_length: usize,
    pub min_length: usize,
}

impl SummaryLength {
    /// Bounds scaled to the combined review text: a quarter of its words,
    /// kept between 50 and 150.
    pub fn for_text(text: &str) -> Self {
        let words = text.split_whitespace().count();
        let max_length = LONGEST_SUMMARY.min(SHORTEST_MAX_LENGTH.max(words / 4));
        let min_length = LONGEST_MIN_LENGTH.min(max_length.saturating_sub(20));
        Self {
            max_length,
            min_length,
        }
    }

    /// Narrowed for the text the model actually receives.
    pub fn for_model_input(self, input: &str) -> Self {
        let words = input.split_whitespace().count();
        Self {
            max_length: self.max_length.min(words / 2),
            min_length: self.min_length.min(MODEL_MIN_LENGTH_CAP),
        }
    }
}

/// Black-box summarization model, e.g. a distilled BART behind a sidecar.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Empty output means the model had nothing to say.
    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String>;
}

/// One entry in the ordered summarizer fallback list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SummarizerProvider {
    /// Summarizer served over HTTP
    Http {
        name: String,
        endpoint: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    60
}

impl SummarizerProvider {
    pub fn name(&self) -> &str {
        match self {
            SummarizerProvider::Http { name, .. } => name,
        }
    }

    pub async fn try_load(&self) -> Result<Arc<dyn Summarizer>> {
        match self {
            SummarizerProvider::Http {
                name,
                endpoint,
                timeout_secs,
            } => {
                let summarizer = HttpSummarizer::connect(name, endpoint, *timeout_secs).await?;
                Ok(Arc::new(summarizer))
            }
        }
    }
}

/// Distilled BART first, the full-size CNN model as fallback.
pub fn default_providers() -> Vec<SummarizerProvider> {
    vec![
        SummarizerProvider::Http {
            name: "distilbart-cnn-12-6".into(),
            endpoint: "http://127.0.0.1:8002/summarize".into(),
            timeout_secs: default_timeout_secs(),
        },
        SummarizerProvider::Http {
            name: "bart-large-cnn".into(),
            endpoint: "http://127.0.0.1:8003/summarize".into(),
            timeout_secs: default_timeout_secs(),
        },
    ]
}

/// Loads the first summarizer that comes up.
pub async fn load_summarizer(providers: &[SummarizerProvider]) -> Result<Arc<dyn Summarizer>> {
    let mut failures = Vec::new();

    for provider in providers {
        match provider.try_load().await {
            Ok(summarizer) => {
                info!("Loaded summarization model '{}'", provider.name());
                return Ok(summarizer);
            }
            Err(e) => {
                warn!("Summarization model '{}' unavailable: {}", provider.name(), e);
                failures.push(format!("{}: {}", provider.name(), e));
            }
        }
    }

    if failures.is_empty() {
        return Err(LensError::SummarizerUnavailable(
            "no summarization providers configured".into(),
        ));
    }
    Err(LensError::SummarizerUnavailable(failures.join("; ")))
}

/// Which reviews go into a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFilter {
    Positive,
    Negative,
    All,
}

impl SummaryFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryFilter::Positive => "POSITIVE",
            SummaryFilter::Negative => "NEGATIVE",
            SummaryFilter::All => "ALL",
        }
    }

    pub fn matches(&self, sentiment: Sentiment) -> bool {
        match self {
            SummaryFilter::Positive => sentiment == Sentiment::Positive,
            SummaryFilter::Negative => sentiment == Sentiment::Negative,
            SummaryFilter::All => true,
        }
    }

    /// `summary_positive.txt`, `summary_negative.txt` or `summary_all.txt`
    pub fn file_name(&self) -> String {
        format!("summary_{}.txt", self.as_str().to_lowercase())
    }
}

impl fmt::Display for SummaryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Space-joined texts of the first `limit` records passing `filter`.
pub fn combine_reviews(records: &[ReviewRecord], filter: SummaryFilter, limit: usize) -> Result<String> {
    if records.is_empty() {
        return Err(LensError::Summary("No data available for summarization".into()));
    }

    let texts: Vec<&str> = records
        .iter()
        .filter(|r| filter.matches(r.sentiment))
        .take(limit)
        .map(|r| r.text.as_str())
        .collect();

    if texts.is_empty() {
        return Err(LensError::Summary(format!(
            "No {} reviews found",
            filter.as_str().to_lowercase()
        )));
    }
    Ok(texts.join(" "))
}

/// First `max_chars` characters, pulled back to the last full stop when
/// that keeps more than half of them.
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> &str {
    let cut = match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => return text,
    };

    match cut.rfind('.') {
        Some(dot) if cut[..dot].chars().count() > max_chars / 2 => &cut[..=dot],
        _ => cut,
    }
}

/// Greedy word wrap to `width` columns; words longer than a line are split.
pub fn fill(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(width) {
            let piece_len = piece.len();
            if line_len > 0 && line_len + 1 + piece_len > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(piece);
            line_len += piece_len;
        }
    }
    if line_len > 0 {
        lines.push(line);
    }

    lines.join("\n")
}

/// Runs review texts through the loaded summarizer.
pub struct SummaryService {
    summarizer: Arc<dyn Summarizer>,
    config: SummaryConfig,
}

impl SummaryService {
    pub fn new(summarizer: Arc<dyn Summarizer>, config: SummaryConfig) -> Self {
        Self { summarizer, config }
    }

    pub async fn load(config: SummaryConfig) -> Result<Self> {
        let summarizer = load_summarizer(&config.providers).await?;
        Ok(Self::new(summarizer, config))
    }

    pub fn model_name(&self) -> &str {
        self.summarizer.name()
    }

    /// Wrapped summary of the records passing `filter`.
    pub async fn summarize_records(&self, records: &[ReviewRecord], filter: SummaryFilter) -> Result<String> {
        let combined = combine_reviews(records, filter, self.config.max_reviews)?;
        self.summarize_text(&combined).await
    }

    /// Wrapped summary of already combined review text.
    pub async fn summarize_text(&self, combined: &str) -> Result<String> {
        check_enough_text(combined, self.config.min_combined_chars)?;

        let requested = SummaryLength::for_text(combined);
        let input = truncate_at_sentence(combined, self.config.max_input_chars);
        if input.trim().chars().count() < MIN_MODEL_INPUT_CHARS {
            return Err(LensError::Summary(
                "Text is too short to summarize effectively.".into(),
            ));
        }

        let length = requested.for_model_input(input);
        debug!(
            chars = input.chars().count(),
            max_length = length.max_length,
            min_length = length.min_length,
            "summarizing"
        );

        let summary = self
            .summarizer
            .summarize(input, length)
            .await
            .map_err(|e| LensError::Summary(format!("Error during summarization: {}", e)))?;

        if summary.trim().is_empty() {
            return Err(LensError::Summary(
                "No summary could be generated from the provided text.".into(),
            ));
        }
        Ok(fill(&summary, self.config.wrap_width))
    }
}

/// Rejects combined text too thin for a meaningful summary.
pub fn check_enough_text(combined: &str, min_chars: usize) -> Result<()> {
    if combined.trim().chars().count() < min_chars {
        return Err(LensError::Summary(
            "Not enough text content to generate a meaningful summary.".into(),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::{service, CannedSummarizer};
    use super::*;

    fn record(text: &str, sentiment: Sentiment) -> ReviewRecord {
        ReviewRecord::new(text, sentiment, 0.9, "https://shop.example/reviews")
    }

    fn sentence(i: usize) -> String {
        format!("Review {} says the kettle boils fast and the handle stays cool.", i)
    }

    #[test]
    fn test_length_scales_with_word_count() {
        assert_eq!(
            SummaryLength::for_text(&"word ".repeat(100)),
            SummaryLength { max_length: 50, min_length: 30 }
        );
        assert_eq!(SummaryLength::for_text(&"word ".repeat(400)).max_length, 100);
        assert_eq!(SummaryLength::for_text(&"word ".repeat(2_000)).max_length, 150);
    }

    #[test]
    fn test_model_length_follows_input() {
        let requested = SummaryLength { max_length: 150, min_length: 30 };
        let narrowed = requested.for_model_input(&"word ".repeat(60));
        assert_eq!(narrowed, SummaryLength { max_length: 30, min_length: 20 });
    }

    #[test]
    fn test_truncate_backs_up_to_full_stop() {
        let text = format!("{}. {}", "a".repeat(700), "b".repeat(600));
        let cut = truncate_at_sentence(&text, 1024);
        assert_eq!(cut.chars().count(), 701);
        assert!(cut.ends_with('.'));
    }

    #[test]
    fn test_truncate_ignores_early_full_stop() {
        let text = format!("{}. {}", "a".repeat(100), "b".repeat(1200));
        let cut = truncate_at_sentence(&text, 1024);
        assert_eq!(cut.chars().count(), 1024);
        assert!(cut.ends_with('b'));
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_at_sentence("Short. Text", 1024), "Short. Text");
        // multibyte text is cut on characters
        let text = "é".repeat(2_000);
        assert_eq!(truncate_at_sentence(&text, 1024).chars().count(), 1024);
    }

    #[test]
    fn test_fill_wraps_at_width() {
        let text = "the kettle boils fast ".repeat(20);
        let filled = fill(&text, 80);

        assert!(filled.lines().count() > 1);
        assert!(filled.lines().all(|l| l.chars().count() <= 80));
        assert_eq!(
            filled.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_fill_splits_long_words() {
        let filled = fill(&"x".repeat(30), 10);
        assert_eq!(filled, "xxxxxxxxxx\nxxxxxxxxxx\nxxxxxxxxxx");
        assert_eq!(fill("", 80), "");
    }

    #[test]
    fn test_combine_filters_and_limits() {
        let mut records: Vec<ReviewRecord> =
            (0..60).map(|i| record(&sentence(i), Sentiment::Positive)).collect();
        records.insert(3, record("Handle snapped on day one.", Sentiment::Negative));

        let positive = combine_reviews(&records, SummaryFilter::Positive, 50).unwrap();
        assert!(positive.starts_with("Review 0 says"));
        assert!(positive.ends_with(&sentence(49)));
        assert!(!positive.contains("snapped"));

        let negative = combine_reviews(&records, SummaryFilter::Negative, 50).unwrap();
        assert_eq!(negative, "Handle snapped on day one.");

        let all = combine_reviews(&records, SummaryFilter::All, 50).unwrap();
        assert!(all.contains("snapped"));
        assert!(all.ends_with(&sentence(48)));
    }

    #[test]
    fn test_combine_reports_missing_sentiment() {
        let records = vec![record(&sentence(1), Sentiment::Positive)];
        match combine_reviews(&records, SummaryFilter::Negative, 50) {
            Err(LensError::Summary(msg)) => assert_eq!(msg, "No negative reviews found"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(combine_reviews(&[], SummaryFilter::All, 50).is_err());
    }

    #[test]
    fn test_filter_file_names() {
        assert_eq!(SummaryFilter::Positive.file_name(), "summary_positive.txt");
        assert_eq!(SummaryFilter::Negative.file_name(), "summary_negative.txt");
        assert_eq!(SummaryFilter::All.file_name(), "summary_all.txt");
    }

    #[tokio::test]
    async fn test_thin_text_never_reaches_model() {
        let summarizer = CannedSummarizer::answering("unused");
        let service = service(summarizer.clone());
        let records = vec![record("Great kettle.", Sentiment::Positive)];

        match service.summarize_records(&records, SummaryFilter::Positive).await {
            Err(LensError::Summary(msg)) => {
                assert_eq!(msg, "Not enough text content to generate a meaningful summary.")
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(summarizer.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_gets_truncated_input_and_bounds() {
        let summarizer = CannedSummarizer::answering(&"Buyers like the kettle. ".repeat(10));
        let service = service(summarizer.clone());
        let records: Vec<ReviewRecord> =
            (0..40).map(|i| record(&sentence(i), Sentiment::Positive)).collect();

        let summary = service
            .summarize_records(&records, SummaryFilter::Positive)
            .await
            .unwrap();

        assert!(summary.lines().count() > 1);
        assert!(summary.lines().all(|l| l.chars().count() <= 80));

        let requests = summarizer.requests.lock().unwrap();
        let (input, length) = &requests[0];
        assert!(input.chars().count() <= 1024);
        assert!(input.ends_with("cool."));
        let words = input.split_whitespace().count();
        assert_eq!(length.max_length, (words / 2).min(120));
        assert_eq!(length.min_length, 20);
    }

    #[tokio::test]
    async fn test_empty_model_answer() {
        let service = service(CannedSummarizer::answering("  "));
        let text = sentence(1).repeat(3);
        match service.summarize_text(&text).await {
            Err(LensError::Summary(msg)) => {
                assert_eq!(msg, "No summary could be generated from the provided text.")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_failure_is_reported() {
        let service = service(CannedSummarizer::failing("CUDA out of memory"));
        let text = sentence(1).repeat(3);
        match service.summarize_text(&text).await {
            Err(LensError::Summary(msg)) => {
                assert!(msg.starts_with("Error during summarization"));
                assert!(msg.contains("CUDA out of memory"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_config_from_toml() {
        let config: SummaryConfig = toml::from_str(
            r#"
max_reviews = 10

[[providers]]
kind = "http"
name = "local-bart"
endpoint = "http://localhost:9100/summarize"
"#,
        )
        .unwrap();

        assert_eq!(config.max_reviews, 10);
        assert_eq!(config.wrap_width, 80);
        assert_eq!(
            config.providers,
            vec![SummarizerProvider::Http {
                name: "local-bart".into(),
                endpoint: "http://localhost:9100/summarize".into(),
                timeout_secs: 60,
            }]
        );
    }

    #[tokio::test]
    async fn test_load_without_providers_fails() {
        let err = load_summarizer(&[]).await.err().unwrap();
        assert!(matches!(err, LensError::SummarizerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_load_names_failed_providers() {
        let providers = vec![SummarizerProvider::Http {
            name: "offline-bart".into(),
            // Port 9 (discard) on localhost refuses connections
            endpoint: "http://127.0.0.1:9/summarize".into(),
            timeout_secs: 1,
        }];
        match load_summarizer(&providers).await.err().unwrap() {
            LensError::SummarizerUnavailable(msg) => assert!(msg.contains("offline-bart")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
