use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::warn;

use crate::app::{AppContext, LensError, Result};
use crate::cli::ScrapePreset;
use crate::content::{clean_records, CleanReport};
use crate::domain::{RunStatus, ScrapeRun, SentimentSummary};
use crate::config::Config;
use crate::export;
use crate::pipeline::spawn_scrape;
use crate::scraper::ScraperConfig;
use crate::store::Store;
use crate::summary::{check_enough_text, combine_reviews, SummaryFilter, SummaryService};

/// Per-invocation overrides for `scrape`
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub output: Option<PathBuf>,
    pub save: bool,
    pub workers: Option<usize>,
    pub headful: bool,
    pub preset: Option<ScrapePreset>,
}

impl ScrapeOptions {
    /// `base` with this invocation's preset, worker count and window mode.
    pub fn apply(&self, base: &Config) -> Config {
        let mut config = base.clone();
        match self.preset {
            Some(ScrapePreset::Fast) => config.scraper = ScraperConfig::fast(),
            Some(ScrapePreset::Thorough) => config.scraper = ScraperConfig::thorough(),
            None => {}
        }
        if let Some(workers) = self.workers {
            config.pipeline.max_workers = workers.max(1);
        }
        if self.headful {
            config.scraper.headless = false;
        }
        config
    }
}

pub async fn scrape(ctx: &AppContext, url: &str, options: ScrapeOptions) -> Result<()> {
    let config = options.apply(&ctx.config);

    println!("Loading sentiment model...");
    let orchestrator = Arc::new(ctx.orchestrator(&config).await?);
    println!("Using model: {}", orchestrator.engine().model_name());

    let run_id = if options.save && config.store.save_runs {
        Some(ctx.store.create_run(&ScrapeRun::new(url.to_string()))?)
    } else {
        None
    };

    let mut handle = spawn_scrape(orchestrator, url.to_string());
    let cancel = handle.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling scrape...");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.next_progress().await {
        match event.fraction() {
            Some(done) => println!("  {} ({:.0}%)", event, done * 100.0),
            None => println!("  {}", event),
        }
    }
    let outcome = handle.join().await;
    interrupt.abort();

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            if let Some(id) = run_id {
                if let Err(store_err) = ctx.store.fail_run(id, &e.to_string()) {
                    warn!("Failed to record failed run {}: {}", id, store_err);
                }
            }
            return Err(e);
        }
    };

    let CleanReport { kept, removed } = clean_records(report.records);

    if let Some(id) = run_id {
        ctx.store.add_reviews(id, &kept)?;
        ctx.store.finish_run(id, report.fragment_count, kept.len())?;
    }

    let path = options.output.unwrap_or_else(export::default_output_path);
    export::write_csv(&path, &kept)?;
    println!("Saved {} reviews to {}", kept.len(), path.display());

    let summary = SentimentSummary::from_records(&kept);
    println!(
        "Analysis ready: {} reviews found ({} positive, {} negative)",
        summary.total(),
        summary.positive,
        summary.negative
    );
    if removed > 0 {
        println!("Removed {} non-review items", removed);
    }
    if let Some(id) = run_id {
        println!("Recorded as run {}", id);
    }

    Ok(())
}

pub async fn classify(ctx: &AppContext, text: &str) -> Result<()> {
    let engine = ctx.sentiment_engine().await?;
    let verdict = engine.get_sentiment(text).await;
    println!("{} ({:.2})", verdict.sentiment, verdict.confidence);
    Ok(())
}

pub fn list_runs(ctx: &AppContext, limit: usize) -> Result<()> {
    let runs = ctx.store.list_runs(limit)?;

    if runs.is_empty() {
        println!("No runs");
        return Ok(());
    }

    for run in runs {
        let started = run.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        match run.status {
            RunStatus::Completed => {
                let counts = ctx.store.sentiment_counts(run.id)?;
                println!(
                    "#{:<4} {} {:<9} {} reviews ({} +, {} -) from {} fragments\n      {}",
                    run.id,
                    started,
                    run.status,
                    run.record_count,
                    counts.positive,
                    counts.negative,
                    run.fragment_count,
                    run.source
                );
            }
            RunStatus::Failed => {
                println!(
                    "#{:<4} {} {:<9} {}\n      {}",
                    run.id,
                    started,
                    run.status,
                    run.error.as_deref().unwrap_or("unknown error"),
                    run.source
                );
            }
            RunStatus::Running => {
                println!("#{:<4} {} {:<9}\n      {}", run.id, started, run.status, run.source);
            }
        }
    }

    Ok(())
}

pub fn export_run(ctx: &AppContext, run_id: i64, output: &Path) -> Result<()> {
    ctx.store
        .get_run(run_id)?
        .ok_or(LensError::RunNotFound(run_id))?;

    let reviews = ctx.store.get_reviews(run_id)?;
    export::write_csv(output, &reviews)?;
    println!("Exported {} reviews to {}", reviews.len(), output.display());
    Ok(())
}

pub fn delete_run(ctx: &AppContext, run_id: i64) -> Result<()> {
    ctx.store
        .get_run(run_id)?
        .ok_or(LensError::RunNotFound(run_id))?;

    ctx.store.delete_run(run_id)?;
    println!("Deleted run {}", run_id);
    Ok(())
}

/// Where the reviews to summarize come from
#[derive(Debug, Clone)]
pub enum SummarySource {
    Run(i64),
    File(PathBuf),
}

pub async fn summarize(
    ctx: &AppContext,
    source: SummarySource,
    filter: SummaryFilter,
    output: Option<PathBuf>,
) -> Result<()> {
    let records = match source {
        SummarySource::Run(run_id) => {
            ctx.store
                .get_run(run_id)?
                .ok_or(LensError::RunNotFound(run_id))?;
            ctx.store.get_reviews(run_id)?
        }
        SummarySource::File(path) => export::read_csv(&path)?,
    };

    // Reject thin input before paying for a model load
    let combined = combine_reviews(&records, filter, ctx.config.summary.max_reviews)?;
    check_enough_text(&combined, ctx.config.summary.min_combined_chars)?;

    println!("Loading summarization model...");
    let service = ctx.summary_service().await?;
    println!("Using model: {}", service.model_name());

    let path = output.unwrap_or_else(|| PathBuf::from(filter.file_name()));
    let summary = write_summary(&service, &combined, &path).await?;

    println!(
        "Summary for {} reviews:\n\n{}\n\nSaved to {}",
        filter.as_str().to_lowercase(),
        summary,
        path.display()
    );
    Ok(())
}

async fn write_summary(service: &SummaryService, combined: &str, path: &Path) -> Result<String> {
    let summary = service.summarize_text(combined).await?;
    // A summary that cannot be saved is still worth printing
    if let Err(e) = std::fs::write(path, &summary) {
        warn!("Could not save summary to {}: {}", path.display(), e);
    }
    Ok(summary)
}

pub fn clean_file(input: &Path, output: Option<&Path>) -> Result<()> {
    let records = export::read_csv(input)?;
    let total = records.len();
    let CleanReport { kept, removed } = clean_records(records);

    let destination = output.unwrap_or(input);
    export::write_csv(destination, &kept)?;
    println!(
        "Kept {} of {} rows ({} removed), written to {}",
        kept.len(),
        total,
        removed,
        destination.display()
    );
    Ok(())
}
