use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::{LensError, Result};
use crate::sentiment::http::HttpModel;
use crate::sentiment::keyword::KeywordModel;

/// Raw verdict of a classification model, before any overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelOutput {
    pub label: String,
    pub score: f32,
}

impl ModelOutput {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Black-box text classifier, e.g. a fine-tuned transformer behind a sidecar.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<ModelOutput>;
}

/// One entry in the ordered model fallback list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Classifier served over HTTP
    Http {
        name: String,
        endpoint: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Built-in keyword model, always available
    Lexicon,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ProviderConfig {
    pub fn name(&self) -> &str {
        match self {
            ProviderConfig::Http { name, .. } => name,
            ProviderConfig::Lexicon => "lexicon",
        }
    }

    /// Try to bring the provider up; errors mean "try the next one".
    pub async fn try_load(&self) -> Result<Arc<dyn SentimentModel>> {
        match self {
            ProviderConfig::Http {
                name,
                endpoint,
                timeout_secs,
            } => {
                let model = HttpModel::connect(name, endpoint, *timeout_secs).await?;
                Ok(Arc::new(model))
            }
            ProviderConfig::Lexicon => Ok(Arc::new(KeywordModel::new())),
        }
    }
}

/// Default order: fine-tuned sidecar, generic pretrained sidecar, lexicon.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::Http {
            name: "fine-tuned".into(),
            endpoint: "http://127.0.0.1:8000/sentiment".into(),
            timeout_secs: default_timeout_secs(),
        },
        ProviderConfig::Http {
            name: "distilbert-sst2".into(),
            endpoint: "http://127.0.0.1:8001/sentiment".into(),
            timeout_secs: default_timeout_secs(),
        },
        ProviderConfig::Lexicon,
    ]
}

/// Loads the first provider that comes up.
pub async fn load_model(providers: &[ProviderConfig]) -> Result<Arc<dyn SentimentModel>> {
    let mut failures = Vec::new();

    for provider in providers {
        match provider.try_load().await {
            Ok(model) => {
                info!("Loaded sentiment model '{}'", provider.name());
                return Ok(model);
            }
            Err(e) => {
                warn!("Sentiment model '{}' unavailable: {}", provider.name(), e);
                failures.push(format!("{}: {}", provider.name(), e));
            }
        }
    }

    if failures.is_empty() {
        return Err(LensError::ModelUnavailable(
            "no sentiment providers configured".into(),
        ));
    }
    Err(LensError::ModelUnavailable(failures.join("; ")))
}
