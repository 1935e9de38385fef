pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::summary::SummaryFilter;

#[derive(Parser)]
#[command(name = "reviewlens")]
#[command(about = "Scrape customer reviews from a web page and classify their sentiment", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/reviewlens/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a page and classify its reviews
    Scrape {
        /// URL of the page holding the reviews
        url: String,

        /// CSV file for the classified reviews (default: scraped_reviews_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't record the scrape in the history database
        #[arg(long)]
        no_save: bool,

        /// Number of concurrent classification batches
        #[arg(short, long)]
        workers: Option<usize>,

        /// Show the browser window
        #[arg(long)]
        headful: bool,

        /// Replace the [scraper] section with a built-in preset
        #[arg(long, value_enum)]
        preset: Option<ScrapePreset>,
    },
    /// Classify a single piece of text
    Classify {
        /// Text to classify
        text: String,
    },
    /// List recorded scrapes
    Runs {
        /// Show at most this many runs
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Export the reviews of a recorded scrape to CSV
    Export {
        /// Run id as shown by `reviewlens runs`
        run_id: i64,

        /// Destination CSV file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Delete a recorded scrape and its reviews
    Delete {
        /// Run id as shown by `reviewlens runs`
        run_id: i64,
    },
    /// Summarize the reviews of one sentiment
    Summarize {
        /// Recorded scrape to summarize
        #[arg(long, conflicts_with = "input", required_unless_present = "input")]
        run: Option<i64>,

        /// CSV file in the reviewlens layout, or with just text and sentiment
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Which reviews to summarize
        #[arg(short, long, value_enum, default_value_t = SummaryFilter::Positive)]
        sentiment: SummaryFilter,

        /// Destination text file (default: summary_<sentiment>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove non-review rows from a CSV file
    Clean {
        /// CSV file in the reviewlens layout
        input: PathBuf,

        /// Destination (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Built-in scraper timing profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScrapePreset {
    /// Fewer scrolls, shorter waits
    Fast,
    /// More scrolls and expander clicks, longer waits
    Thorough,
}
