//! # reviewlens
//!
//! Scrapes customer reviews from arbitrary web pages with headless Chrome and
//! classifies their sentiment.
//!
//! ## Architecture
//!
//! ```text
//! URL → Page Extractor → fragments → batches → Batch Processor (parallel)
//!     → Sentiment Engine → records → clean-up → Store / CSV
//!
//! records → filter by sentiment → Summarizer → summary_<sentiment>.txt
//! ```
//!
//! - [`scraper`]: browser session state machine and layered extraction
//! - [`content`]: review vs. page-chrome heuristics
//! - [`normalizer`]: whitespace and review-text cleaning
//! - [`sentiment`]: model providers plus lexical override rules
//! - [`pipeline`]: batching, deduplication, worker pool, progress
//! - [`store`]: SQLite history of scrapes
//! - [`summary`]: abstractive summaries over a summarizer sidecar
//!
//! ## Quick Start
//!
//! ```bash
//! # Scrape a page and save the reviews
//! reviewlens scrape https://www.trustpilot.com/review/example.com --output reviews.csv
//!
//! # Classify a single text
//! reviewlens classify "Arrived late and the box was damaged"
//!
//! # Past scrapes
//! reviewlens runs
//! reviewlens export 3 --output run3.csv
//!
//! # Summarize the negative reviews of a scrape
//! reviewlens summarize --run 3 --sentiment negative
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together config and store.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/reviewlens/config.toml`, with sections for the
/// scraper, sentiment providers, pipeline and store.
pub mod config;

/// Command-line interface using clap.
///
/// - `scrape <url>` - Scrape and classify a page
/// - `classify <text>` - Classify one text
/// - `runs` - List recorded scrapes
/// - `export <run> --output <csv>` - Export a recorded scrape
/// - `delete <run>` - Delete a recorded scrape
/// - `summarize --run <run> | --input <csv>` - Summarize one sentiment
/// - `clean <csv>` - Remove non-review rows from a CSV file
pub mod cli;

/// Heuristics that reject navigation, boilerplate and listing text.
pub mod content;

/// Core domain models.
///
/// - [`ReviewRecord`](domain::ReviewRecord): one classified review
/// - [`Sentiment`](domain::Sentiment): POSITIVE / NEGATIVE / NEUTRAL
/// - [`ScrapeRun`](domain::ScrapeRun): a recorded scrape
pub mod domain;

/// CSV export and import in the record column layout.
pub mod export;

/// Text normalization shared by extraction and classification.
pub mod normalizer;

/// Fragment batching, deduplication and the scrape orchestrator.
pub mod pipeline;

/// Headless-browser extraction.
///
/// - [`PageExtractor`](scraper::PageExtractor): drives one session
/// - [`ChromeLauncher`](scraper::ChromeLauncher): chromiumoxide-backed browser
/// - [`BrowserPage`](scraper::BrowserPage): what the extractor needs from a tab
pub mod scraper;

/// Sentiment classification.
pub mod sentiment;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Review summaries.
///
/// - [`SummaryService`](summary::SummaryService): combine, truncate, summarize, wrap
/// - [`Summarizer`](summary::Summarizer): what the service needs from a model
pub mod summary;
