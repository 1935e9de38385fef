use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::app::{LensError, Result};
use crate::sentiment::model::{ModelOutput, SentimentModel};

const WARMUP_TEXT: &str = "warm up";

/// Classifier served by a local inference sidecar.
///
/// Requests are `POST {"text": ...}`; the response may be the pipeline-style
/// list `[{"label": "...", "score": 0.9}]` or a single object.
pub struct HttpModel {
    name: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Many(Vec<ModelOutput>),
    One(ModelOutput),
}

impl HttpModel {
    pub fn new(name: &str, endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("reviewlens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            client,
        })
    }

    /// Build the client and prove the endpoint answers before handing it out.
    pub async fn connect(name: &str, endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let model = Self::new(name, endpoint, timeout_secs)?;
        model.classify(WARMUP_TEXT).await?;
        Ok(model)
    }
}

#[async_trait]
impl SentimentModel for HttpModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, text: &str) -> Result<ModelOutput> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        response.error_for_status_ref()?;

        match response.json::<ClassifyResponse>().await? {
            ClassifyResponse::One(output) => Ok(output),
            ClassifyResponse::Many(outputs) => outputs
                .into_iter()
                .next()
                .ok_or_else(|| LensError::Model(format!("{} returned no predictions", self.name))),
        }
    }
}
