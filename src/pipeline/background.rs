use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::{LensError, Result};
use crate::pipeline::orchestrator::{Orchestrator, ScrapeReport};
use crate::pipeline::{Progress, ProgressSink};

/// Handle to a scrape running as a background task
pub struct ScrapeHandle {
    progress: mpsc::UnboundedReceiver<Progress>,
    cancel: CancellationToken,
    task: JoinHandle<Result<ScrapeReport>>,
}

impl ScrapeHandle {
    /// Next progress event; `None` once the scrape has finished
    pub async fn next_progress(&mut self) -> Option<Progress> {
        self.progress.recv().await
    }

    /// Ask the scrape to stop. The browser is still closed.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the scrape and return its outcome
    pub async fn join(self) -> Result<ScrapeReport> {
        self.task
            .await
            .map_err(|e| LensError::Other(format!("Scrape task failed: {}", e)))?
    }
}

/// Spawn a scrape of `url` as a tokio task, streaming progress back
pub fn spawn_scrape(orchestrator: Arc<Orchestrator>, url: String) -> ScrapeHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let sink: ProgressSink = Arc::new(move |event| {
        // Receiver gone means nobody is watching; keep scraping
        let _ = tx.send(event);
    });

    let token = cancel.clone();
    let task = tokio::spawn(async move {
        info!("Background scrape started: {}", url);
        orchestrator.run(&url, sink, token).await
    });

    ScrapeHandle {
        progress: rx,
        cancel,
        task,
    }
}
