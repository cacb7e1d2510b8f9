//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not build the engine or run cycles (see `main`).
//! - Does not load `.env` files (done before parsing so clap env defaults
//!   can read them).

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fetchboard")]
#[command(
    about = "Fetchboard - periodic REST query execution and aggregation",
    long_about = None
)]
#[command(version)]
#[command(
    after_help = "Examples:\n  fetchboard --queries queries.json --secret API_TOKEN=abc123\n  fetchboard --queries queries.json --output results.json --once\n  FETCHBOARD_QUERIES=queries.json fetchboard -s TOKEN=t1 -s KEY=k1\n"
)]
pub struct Cli {
    /// Path to the JSON query-set snapshot file (re-read every tick)
    #[arg(short, long, env = "FETCHBOARD_QUERIES", value_name = "FILE")]
    pub queries: PathBuf,

    /// Secret entry in name=value form (repeatable)
    #[arg(short, long = "secret", value_name = "NAME=VALUE")]
    pub secret: Vec<String>,

    /// Output file for each cycle's results (stdout when omitted)
    #[arg(short, long, env = "FETCHBOARD_OUTPUT", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "FETCHBOARD_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum pages to follow per query
    #[arg(long, env = "FETCHBOARD_MAX_PAGES")]
    pub max_pages: Option<usize>,

    /// Maximum queries executed concurrently per cycle
    #[arg(long, env = "FETCHBOARD_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Run a single refresh cycle and exit
    #[arg(long)]
    pub once: bool,
}
