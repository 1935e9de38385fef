use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::app::Result;
use crate::sentiment::model::{ModelOutput, SentimentModel};

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better", "happy",
        "perfect", "awesome", "incredible", "delightful", "pleasant", "satisfying", "satisfied",
        "recommend", "recommended", "impressive", "exceptional", "remarkable", "efficient",
        "effective", "helpful", "reliable", "trustworthy", "quality", "valuable", "comfortable",
        "fast", "quick", "friendly", "sturdy", "worth",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate", "hated",
        "dislike", "disappointing", "disappointed", "failure", "failed", "fail", "sad",
        "unhappy", "angry", "annoyed", "frustrated", "frustrating", "problem", "problems",
        "issue", "issues", "broken", "broke", "crash", "crashed", "wrong", "useless", "waste",
        "scam", "fraud", "fake", "unreliable", "slow", "difficult", "confusing", "expensive",
        "overpriced", "worthless", "garbage", "trash", "rubbish", "pathetic", "mediocre",
        "refund", "late", "delayed", "damaged", "missing",
    ]
    .into_iter()
    .collect()
});

/// Score reported when the text carries no decisive sentiment; it sits in the
/// undecided band so the engine falls back to its phrase counts.
const UNDECIDED_SCORE: f32 = 0.65;

/// Offline word-list classifier used when no served model is reachable.
#[derive(Debug, Clone, Default)]
pub struct KeywordModel;

impl KeywordModel {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> ModelOutput {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| w.len() > 2)
            .collect();

        let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
        let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();
        let total = positive + negative;

        if total == 0 {
            return ModelOutput::new("neutral", UNDECIDED_SCORE);
        }

        let positive_ratio = positive as f32 / total as f32;
        if positive_ratio > 0.6 {
            ModelOutput::new("positive", positive_ratio)
        } else if positive_ratio < 0.4 {
            ModelOutput::new("negative", 1.0 - positive_ratio)
        } else {
            ModelOutput::new("neutral", UNDECIDED_SCORE)
        }
    }
}

#[async_trait]
impl SentimentModel for KeywordModel {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<ModelOutput> {
        Ok(Self::score(text))
    }
}
