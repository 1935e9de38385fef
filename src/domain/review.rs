use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder used for record fields the page never exposes.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Ok(Sentiment::Positive),
            "NEGATIVE" => Ok(Sentiment::Negative),
            "NEUTRAL" => Ok(Sentiment::Neutral),
            other => Err(format!("Unknown sentiment: {}", other)),
        }
    }
}

/// One classified review, laid out in the exported column order.
///
/// Only `text` and `sentiment` are required when reading; hand-made files
/// with just those two columns get placeholders for the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Fragment text as it was extracted, before cleaning
    pub text: String,
    pub sentiment: Sentiment,
    #[serde(default = "unknown")]
    pub source: String,
    #[serde(rename = "date", with = "local_timestamp", default = "Local::now")]
    pub captured_at: DateTime<Local>,
    #[serde(default = "unknown")]
    pub user_id: String,
    #[serde(default = "unknown")]
    pub location: String,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn default_confidence() -> f32 {
    0.5
}

impl ReviewRecord {
    pub fn new(text: impl Into<String>, sentiment: Sentiment, confidence: f32, source: &str) -> Self {
        Self {
            text: text.into(),
            sentiment,
            source: source.to_string(),
            captured_at: Local::now(),
            user_id: UNKNOWN.to_string(),
            location: UNKNOWN.to_string(),
            confidence,
        }
    }

    /// Deterministic ID for a record inside a scrape run
    pub fn generate_id(run_id: i64, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(run_id.to_le_bytes());
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Positive/negative tallies over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentSummary {
    pub fn from_records(records: &[ReviewRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            match r.sentiment {
                Sentiment::Positive => acc.positive += 1,
                Sentiment::Negative => acc.negative += 1,
                Sentiment::Neutral => acc.neutral += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// `YYYY-MM-DD HH:MM:SS` in local time, the format external tools read.
pub mod local_timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn format(dt: &DateTime<Local>) -> String {
        dt.format(FORMAT).to_string()
    }

    pub fn parse(s: &str) -> Option<DateTime<Local>> {
        let naive = NaiveDateTime::parse_from_str(s.trim(), FORMAT).ok()?;
        Local.from_local_datetime(&naive).earliest()
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s)))
    }
}
