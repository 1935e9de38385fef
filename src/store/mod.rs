pub mod sqlite;

use crate::app::Result;
use crate::domain::{ReviewRecord, ScrapeRun, SentimentSummary};

pub use sqlite::SqliteStore;

pub trait Store {
    // Run operations
    fn create_run(&self, run: &ScrapeRun) -> Result<i64>;
    fn finish_run(&self, id: i64, fragment_count: usize, record_count: usize) -> Result<()>;
    fn fail_run(&self, id: i64, error: &str) -> Result<()>;
    fn get_run(&self, id: i64) -> Result<Option<ScrapeRun>>;
    fn list_runs(&self, limit: usize) -> Result<Vec<ScrapeRun>>;
    fn delete_run(&self, id: i64) -> Result<()>;

    // Review operations
    fn add_reviews(&self, run_id: i64, records: &[ReviewRecord]) -> Result<usize>;
    fn get_reviews(&self, run_id: i64) -> Result<Vec<ReviewRecord>>;
    fn sentiment_counts(&self, run_id: i64) -> Result<SentimentSummary>;
}
