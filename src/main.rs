use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reviewlens::app::AppContext;
use reviewlens::cli::commands::{self, ScrapeOptions, SummarySource};
use reviewlens::cli::{Cli, Commands};
use reviewlens::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let context = move || AppContext::new(config);

    match cli.command {
        Commands::Scrape {
            url,
            output,
            no_save,
            workers,
            headful,
            preset,
        } => {
            let options = ScrapeOptions {
                output,
                save: !no_save,
                workers,
                headful,
                preset,
            };
            commands::scrape(&context()?, &url, options).await?;
        }
        Commands::Classify { text } => {
            commands::classify(&context()?, &text).await?;
        }
        Commands::Runs { limit } => {
            commands::list_runs(&context()?, limit)?;
        }
        Commands::Export { run_id, output } => {
            commands::export_run(&context()?, run_id, &output)?;
        }
        Commands::Delete { run_id } => {
            commands::delete_run(&context()?, run_id)?;
        }
        Commands::Summarize {
            run,
            input,
            sentiment,
            output,
        } => {
            let source = match (run, input) {
                (Some(run_id), _) => SummarySource::Run(run_id),
                (None, Some(path)) => SummarySource::File(path),
                (None, None) => anyhow::bail!("Pass --run or --input"),
            };
            commands::summarize(&context()?, source, sentiment, output).await?;
        }
        Commands::Clean { input, output } => {
            commands::clean_file(&input, output.as_deref())?;
        }
    }

    Ok(())
}
