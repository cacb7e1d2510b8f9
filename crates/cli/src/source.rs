//! File-backed collaborators: the config source and the result sink.
//!
//! Responsibilities:
//! - Re-read the query-set snapshot file on every tick, so edits take
//!   effect at the next cycle without a restart.
//! - Write each cycle's full row-aligned result set, replacing the
//!   previous cycle's output.
//!
//! Does NOT handle:
//! - Snapshot validation beyond JSON deserialization (malformed descriptors
//!   fail their own query with a taxonomy code inside the engine).

use std::path::PathBuf;

use anyhow::Context;

use fetchboard_engine::{ConfigSnapshot, ConfigSource, QueryResult, ResultSink};

/// Config source backed by a JSON snapshot file.
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigSource for FileConfigSource {
    async fn fetch(&self) -> anyhow::Result<ConfigSnapshot> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading query set {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing query set {}", self.path.display()))
    }
}

/// Result sink writing each cycle as pretty-printed JSON.
///
/// With a path, the file is rewritten wholesale each cycle; without one,
/// the cycle is printed to stdout.
pub struct JsonSink {
    path: Option<PathBuf>,
}

impl JsonSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ResultSink for JsonSink {
    async fn publish(&self, results: Vec<QueryResult>) -> anyhow::Result<()> {
        let rendered = serde_json::to_string_pretty(&results).context("serializing results")?;
        match &self.path {
            Some(path) => {
                tokio::fs::write(path, format!("{rendered}\n"))
                    .await
                    .with_context(|| format!("writing results to {}", path.display()))?;
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}
