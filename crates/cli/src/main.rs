//! Fetchboard CLI - periodic REST query execution and aggregation.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Assemble the engine (executor, secret map, collaborators) and run the
//!   refresh scheduler, or a single cycle with `--once`.
//! - Install the Ctrl+C handler driving graceful shutdown.
//!
//! Does NOT handle:
//! - Query execution or result assembly (see `crates/engine`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` can provide
//!   clap env defaults.
//! - CLI flags take precedence over environment variables.

mod args;
mod error;
mod source;

use std::time::Duration;

use args::Cli;
use clap::Parser;
use error::ExitCode;
use source::{FileConfigSource, JsonSink};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fetchboard_config::{EngineSettings, SecretMap, apply_env, load_dotenv};
use fetchboard_engine::{QueryExecutor, Scheduler, ShutdownToken};

#[tokio::main]
async fn main() {
    // Load .env BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = load_dotenv() {
        eprintln!("Failed to load environment: {e}");
        std::process::exit(ExitCode::ConfigError.as_i32());
    }

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    match run(cli).await {
        Ok(()) => std::process::exit(ExitCode::Success.as_i32()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let secrets = SecretMap::parse_entries(&cli.secret)?;

    let mut settings = EngineSettings::default();
    apply_env(&mut settings)?;
    if let Some(timeout) = cli.timeout {
        settings.timeout = Duration::from_secs(timeout);
    }
    if let Some(max_pages) = cli.max_pages {
        settings.max_pages = max_pages;
    }
    if let Some(concurrency) = cli.concurrency {
        settings.concurrency = concurrency;
    }

    let executor = QueryExecutor::from_settings(&settings)?;
    let source = FileConfigSource::new(cli.queries);
    let sink = JsonSink::new(cli.output);
    let scheduler = Scheduler::new(executor, secrets, source, sink)
        .concurrency(settings.concurrency)
        .shutdown_grace(settings.shutdown_grace);

    if cli.once {
        return scheduler.run_once().await;
    }

    let shutdown = ShutdownToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested, finishing in-flight work");
                shutdown.trigger();
            }
        });
    }

    scheduler.run(shutdown).await
}
