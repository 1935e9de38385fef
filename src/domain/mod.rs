pub mod review;
pub mod run;

pub use review::{ReviewRecord, Sentiment, SentimentSummary, UNKNOWN};
pub use run::{RunStatus, ScrapeRun};
