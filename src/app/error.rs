use thiserror::Error;

#[derive(Error, Debug)]
pub enum LensError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to load page: {0}")]
    PageLoad(String),

    #[error("No valid review data found on the page. Try a different URL or adjust the scraping settings.")]
    NoFragments,

    #[error("No valid review data found on the page!")]
    NoReviewData,

    #[error("Sentiment model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Sentiment model error: {0}")]
    Model(String),

    #[error("Summarization model could not be loaded. Check that a summarizer endpoint is running: {0}")]
    SummarizerUnavailable(String),

    #[error("{0}")]
    Summary(String),

    #[error("Scrape cancelled")]
    Cancelled,

    #[error("Scrape run not found: {0}")]
    RunNotFound(i64),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LensError>;
