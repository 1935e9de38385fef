use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::app::Result;
use crate::summary::{Summarizer, SummaryLength};

const WARMUP_TEXT: &str = "The kettle arrived on time. It boils water quickly and quietly.";

/// Summarizer served by a local inference sidecar.
///
/// Requests are `POST {"text": ..., "max_length": ..., "min_length": ...}`;
/// the response may be the pipeline-style list `[{"summary_text": "..."}]`
/// or a single object.
pub struct HttpSummarizer {
    name: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummarizeResponse {
    Many(Vec<SummaryOutput>),
    One(SummaryOutput),
}

impl SummarizeResponse {
    /// First summary, or empty when the model returned none.
    fn into_text(self) -> String {
        match self {
            SummarizeResponse::One(output) => output.summary_text,
            SummarizeResponse::Many(outputs) => outputs
                .into_iter()
                .next()
                .map(|o| o.summary_text)
                .unwrap_or_default(),
        }
    }
}

impl HttpSummarizer {
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

    /// Build the client and make sure the endpoint answers before handing it out.
    pub async fn connect(name: &str, endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let summarizer = Self::new(name, endpoint, timeout_secs)?;
        let length = SummaryLength {
            max_length: 10,
            min_length: 2,
        };
        summarizer.summarize(WARMUP_TEXT, length).await?;
        Ok(summarizer)
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "text": text,
                "max_length": length.max_length,
                "min_length": length.min_length,
            }))
            .send()
            .await?;

        response.error_for_status_ref()?;

        Ok(response.json::<SummarizeResponse>().await?.into_text())
    }
}
