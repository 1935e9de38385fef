use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{LensError, Result};
use crate::config::Config;
use crate::pipeline::Orchestrator;
use crate::sentiment::SentimentEngine;
use crate::store::sqlite::SqliteStore;
use crate::summary::SummaryService;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match config.store.path.clone() {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Ok(Self { config, store })
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self { config, store })
    }

    /// Load the sentiment model and build a Chrome-backed orchestrator.
    ///
    /// `config` is normally `self.config` with per-run overrides applied.
    pub async fn orchestrator(&self, config: &Config) -> Result<Orchestrator> {
        Orchestrator::start(config).await
    }

    pub async fn sentiment_engine(&self) -> Result<SentimentEngine> {
        SentimentEngine::load(self.config.sentiment.clone()).await
    }

    pub async fn summary_service(&self) -> Result<SummaryService> {
        SummaryService::load(self.config.summary.clone()).await
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| LensError::Config("Could not find data directory".into()))?;
        let lens_dir = data_dir.join("reviewlens");
        std::fs::create_dir_all(&lens_dir)?;
        Ok(lens_dir.join("reviewlens.db"))
    }
}
