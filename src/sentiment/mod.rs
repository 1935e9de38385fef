//! Sentiment classification with lexical overrides.
//!
//! A [`SentimentEngine`] wraps one loaded [`SentimentModel`] and layers
//! phrase-count rules on top of its raw output:
//!
//! ```text
//! text → degenerate/statistics guards → model → sarcasm → short-text
//!      → phrase counts → generic LABEL_n → textual label → score thresholds
//! ```
//!
//! Rule order matters and is fixed. The engine never fails: model errors
//! degrade to `(NEUTRAL, 0.5)`.

pub mod http;
pub mod keyword;
pub mod lexicon;
pub mod model;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Sentiment;
use crate::normalizer::truncate_chars;

pub use keyword::KeywordModel;
pub use model::{default_providers, load_model, ModelOutput, ProviderConfig, SentimentModel};

use lexicon::{
    contains_any, count_matches, has_negation, NEGATIVE_PHRASES, POSITIVE_DOUBT_WORDS,
    POSITIVE_PHRASES, STRONG_NEGATIVE, STRONG_POSITIVE,
};

const NEUTRAL_CONFIDENCE: f32 = 0.5;
const OVERRIDE_CONFIDENCE: f32 = 0.9;
const AMBIGUOUS_CONFIDENCE: f32 = 0.7;
const MIN_TEXT_CHARS: usize = 10;
const SHORT_TEXT_CHARS: usize = 50;
const NEGATIVE_THRESHOLD: f32 = 0.6;
const POSITIVE_THRESHOLD: f32 = 0.7;

static METADATA_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Z]{1,2}\s*\n*[A-Za-z\s]+\s*\n*[A-Z]{2}\s*\n*•\s*\d+\s*reviews*\s*\n*(\d+\s*(days|hours|minutes)\s*ago)?$",
    )
    .expect("valid metadata pattern")
});

static RATING_STATS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(star|reviews|total|\d+%)").expect("valid stats pattern"));

static SENTIMENT_BEARING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(good|bad|love|hate|terrible|excellent)").expect("valid sentiment pattern")
});

/// Configuration for the sentiment stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Longest prefix of the text handed to the model (default: 512)
    pub max_input_chars: usize,

    /// Model providers, tried in order until one loads
    pub providers: Vec<ProviderConfig>,

    /// Phrases that force NEGATIVE at the model's raw score
    pub sarcasm_indicators: Vec<String>,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 512,
            providers: default_providers(),
            sarcasm_indicators: lexicon::DEFAULT_SARCASM_INDICATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Final label and confidence for one text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub sentiment: Sentiment,
    pub confidence: f32,
}

impl Verdict {
    pub fn new(sentiment: Sentiment, confidence: f32) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            NEUTRAL_CONFIDENCE
        };
        Self {
            sentiment,
            confidence,
        }
    }

    pub fn neutral() -> Self {
        Self::new(Sentiment::Neutral, NEUTRAL_CONFIDENCE)
    }
}

/// Shared classification service; construct once and pass by reference.
#[derive(Clone)]
pub struct SentimentEngine {
    model: Arc<dyn SentimentModel>,
    config: SentimentConfig,
    sarcasm: Vec<String>,
}

impl SentimentEngine {
    pub fn new(model: Arc<dyn SentimentModel>, config: SentimentConfig) -> Self {
        let sarcasm = config
            .sarcasm_indicators
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        Self {
            model,
            config,
            sarcasm,
        }
    }

    /// Load the first available provider from `config` and wrap it.
    pub async fn load(config: SentimentConfig) -> crate::app::Result<Self> {
        let model = load_model(&config.providers).await?;
        Ok(Self::new(model, config))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Classify cleaned review text. Never fails.
    pub async fn get_sentiment(&self, text: &str) -> Verdict {
        let trimmed = text.trim();

        if trimmed.chars().count() < MIN_TEXT_CHARS
            || text.matches('\n').count() > text.matches(' ').count()
            || METADATA_ONLY.is_match(trimmed)
        {
            return Verdict::neutral();
        }

        let lower = text.to_lowercase();

        if RATING_STATS.is_match(text) && !SENTIMENT_BEARING.is_match(&lower) {
            return Verdict::neutral();
        }

        let input = truncate_chars(text, self.config.max_input_chars);
        let output = match self.model.classify(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Sentiment model '{}' failed: {}", self.model.name(), e);
                return Verdict::neutral();
            }
        };
        debug!(label = %output.label, score = output.score, "model output");

        self.apply_overrides(text, &lower, &output)
    }

    fn apply_overrides(&self, text: &str, lower: &str, output: &ModelOutput) -> Verdict {
        let score = output.score;
        let negative_count = count_matches(lower, NEGATIVE_PHRASES);
        let positive_count = count_matches(lower, POSITIVE_PHRASES);

        if self.sarcasm.iter().any(|s| lower.contains(s.as_str())) {
            return Verdict::new(Sentiment::Negative, score);
        }

        if text.trim().chars().count() < SHORT_TEXT_CHARS {
            if contains_any(lower, STRONG_NEGATIVE) {
                return Verdict::new(Sentiment::Negative, OVERRIDE_CONFIDENCE);
            }
            if contains_any(lower, STRONG_POSITIVE) {
                return Verdict::new(Sentiment::Positive, OVERRIDE_CONFIDENCE);
            }
        }

        if negative_count >= 1 && negative_count > positive_count {
            return Verdict::new(Sentiment::Negative, OVERRIDE_CONFIDENCE);
        }
        if positive_count >= 1 && positive_count > negative_count && !has_negation(lower) {
            return Verdict::new(Sentiment::Positive, OVERRIDE_CONFIDENCE);
        }

        if let Some(index) = generic_label_index(&output.label) {
            if index == 1 && negative_count >= 1 {
                return Verdict::new(Sentiment::Negative, OVERRIDE_CONFIDENCE);
            }
            if index == 0 {
                return Verdict::new(Sentiment::Negative, OVERRIDE_CONFIDENCE);
            }
            if contains_any(lower, POSITIVE_DOUBT_WORDS) {
                return Verdict::new(Sentiment::Negative, OVERRIDE_CONFIDENCE);
            }
            return Verdict::new(Sentiment::Positive, OVERRIDE_CONFIDENCE);
        }

        match output.label.to_lowercase().as_str() {
            "negative" => return Verdict::new(Sentiment::Negative, score),
            "positive" => return Verdict::new(Sentiment::Positive, score),
            _ => {}
        }

        if score < NEGATIVE_THRESHOLD {
            Verdict::new(Sentiment::Negative, score)
        } else if score > POSITIVE_THRESHOLD {
            Verdict::new(Sentiment::Positive, score)
        } else if negative_count > 0 {
            Verdict::new(Sentiment::Negative, AMBIGUOUS_CONFIDENCE)
        } else if positive_count > 0 {
            Verdict::new(Sentiment::Positive, AMBIGUOUS_CONFIDENCE)
        } else {
            Verdict::neutral()
        }
    }
}

/// `LABEL_0` → 0, `LABEL_1` → 1; anything else is not a generic index label.
fn generic_label_index(label: &str) -> Option<u32> {
    label.strip_prefix("LABEL_")?.parse().ok()
}
