//! Configuration management for reviewlens.
//!
//! Configuration is read from `~/.config/reviewlens/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::pipeline::PipelineConfig;
use crate::scraper::ScraperConfig;
use crate::sentiment::SentimentConfig;
use crate::summary::SummaryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub sentiment: SentimentConfig,
    pub pipeline: PipelineConfig,
    pub summary: SummaryConfig,
    pub store: StoreConfig,
}

/// Where scrape history is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; defaults to the platform data directory
    pub path: Option<PathBuf>,

    /// Record every scrape in the history database (default: true)
    pub save_runs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            save_runs: true,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/reviewlens/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("reviewlens").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# reviewlens configuration
#
# Every key is optional; anything left out uses the built-in default.
# Locators starting with "/" or "(" are XPath, anything else is a CSS selector.

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Page load timeout in seconds
timeout_secs = 30

# Browser window size
window_width = 1366
window_height = 768

# Waits, in milliseconds
settle_after_load_ms = 5000
consent_settle_ms = 2000
scroll_pause_ms = 2500
load_more_wait_ms = 3000
retry_top_wait_ms = 1000
retry_bottom_wait_ms = 2000
expand_settle_ms = 500

# Stop scrolling after this many rounds even if the page keeps growing
max_scrolls = 15

# Most "read more" clicks per locator
max_expander_clicks = 50

# Fallback extraction layers run while fewer fragments than this were found
min_fragments = 5

# Cookie/consent buttons, tried in order
consent_locators = [
    "//*[contains(text(), 'Accept')]",
    "//*[contains(text(), 'I agree')]",
    "#onetrust-accept-btn-handler",
    "button[id*='accept']",
]

[sentiment]
# Longest prefix of a review handed to the model
max_input_chars = 512

# Model providers, tried in order until one answers.
# "http" providers POST {"text": ...} and expect {"label": ..., "score": ...}.
# "lexicon" is the built-in keyword model and never fails to load.
[[sentiment.providers]]
kind = "http"
name = "fine-tuned"
endpoint = "http://127.0.0.1:8000/sentiment"
timeout_secs = 10

[[sentiment.providers]]
kind = "http"
name = "distilbert-sst2"
endpoint = "http://127.0.0.1:8001/sentiment"
timeout_secs = 10

[[sentiment.providers]]
kind = "lexicon"

[pipeline]
# Fragments per classification batch
batch_size = 7

# Concurrent classification batches
max_workers = 4

# Skip fragments shorter than this many characters
min_fragment_chars = 20

# Skip cleaned reviews with fewer words
min_review_words = 5

[summary]
# Only the first this many matching reviews are summarized
max_reviews = 50

# Refuse to summarize less combined review text than this many characters
min_combined_chars = 100

# Longest input handed to the model, cut back to a full stop where possible
max_input_chars = 1024

# Column width of the written summary
wrap_width = 80

# Summarizers, tried in order until one answers.
# They receive {"text": ..., "max_length": ..., "min_length": ...}
# and answer [{"summary_text": ...}].
[[summary.providers]]
kind = "http"
name = "distilbart-cnn-12-6"
endpoint = "http://127.0.0.1:8002/summarize"
timeout_secs = 60

[[summary.providers]]
kind = "http"
name = "bart-large-cnn"
endpoint = "http://127.0.0.1:8003/summarize"
timeout_secs = 60

[store]
# Keep a history of scrapes (see `reviewlens runs`)
save_runs = true

# Database file; defaults to the platform data directory
# path = "/home/me/.local/share/reviewlens/reviewlens.db"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
