//! Refresh scheduler: the tick loop driving full query-set cycles.
//!
//! Responsibilities:
//! - Fetch a fresh configuration snapshot each tick and treat it as
//!   immutable for the whole cycle.
//! - Fan out one query task per descriptor with bounded concurrency.
//! - Keep results row-aligned with the query list regardless of completion
//!   order.
//! - Publish the full result set to the sink, then sleep interval + jitter.
//!
//! Does NOT handle:
//! - Per-query error conversion (see `runner`).
//! - Config/sink transport (collaborator traits implemented by callers).
//!
//! Invariants:
//! - One query's failure never affects another query's result in the same
//!   cycle; a panicked query task is recorded as an unclassified failure.
//! - A config fetch failure skips the tick; it never produces a result set.
//! - Queries never open their own store/sink connections; collaborators are
//!   owned here and results are handed over, not shared.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rand::RngExt;
use tracing::{debug, warn};

use fetchboard_config::SecretMap;
use fetchboard_config::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_INTERVAL_SECS, DEFAULT_SHUTDOWN_GRACE_SECS,
};

use crate::executor::QueryExecutor;
use crate::models::{ConfigSnapshot, QueryResult};
use crate::runner;
use crate::shutdown::ShutdownToken;

/// Source of per-tick configuration snapshots (the tabular config store).
pub trait ConfigSource {
    /// Fetch the current configuration and query list.
    fn fetch(&self) -> impl Future<Output = anyhow::Result<ConfigSnapshot>> + Send;
}

/// Destination for each cycle's row-aligned result set.
///
/// The published list fully replaces the previous cycle's output.
pub trait ResultSink {
    /// Publish one cycle's results, ordered like the snapshot's query list.
    fn publish(&self, results: Vec<QueryResult>) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Runs the query set on a jittered interval until shut down.
pub struct Scheduler<S, K> {
    executor: Arc<QueryExecutor>,
    secrets: Arc<SecretMap>,
    source: S,
    sink: K,
    concurrency: usize,
    shutdown_grace: Duration,
}

impl<S: ConfigSource, K: ResultSink> Scheduler<S, K> {
    /// Create a scheduler with default concurrency and shutdown grace.
    pub fn new(executor: QueryExecutor, secrets: SecretMap, source: S, sink: K) -> Self {
        Self {
            executor: Arc::new(executor),
            secrets: Arc::new(secrets),
            source,
            sink,
            concurrency: DEFAULT_CONCURRENCY,
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }

    /// Set the number of queries executed concurrently within one cycle.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the grace period granted to an in-flight cycle on shutdown.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run refresh cycles until the shutdown token is triggered.
    ///
    /// A config fetch failure logs a warning and skips the tick. A sink
    /// failure logs a warning and the loop continues; the next cycle fully
    /// replaces the lost output anyway.
    pub async fn run(&self, shutdown: ShutdownToken) -> anyhow::Result<()> {
        loop {
            if shutdown.is_triggered() {
                break;
            }

            let snapshot = match self.source.fetch().await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(error = %error, "config fetch failed, skipping tick");
                    let retry_in = Duration::from_secs(DEFAULT_INTERVAL_SECS);
                    if !sleep_or_shutdown(retry_in, &shutdown).await {
                        break;
                    }
                    continue;
                }
            };

            let delay = jittered_delay(snapshot.interval_secs, snapshot.jitter_secs);
            debug!(
                version = snapshot.version,
                queries = snapshot.queries.len(),
                "starting refresh cycle"
            );

            let mut cycle = tokio::spawn(run_cycle(
                Arc::clone(&self.executor),
                Arc::clone(&self.secrets),
                snapshot,
                self.concurrency,
            ));
            let results = tokio::select! {
                joined = &mut cycle => match joined {
                    Ok(results) => Some(results),
                    Err(error) => {
                        warn!(error = %error, "refresh cycle task failed");
                        None
                    }
                },
                _ = shutdown.triggered() => {
                    // Give in-flight queries a bounded chance to finish.
                    match tokio::time::timeout(self.shutdown_grace, &mut cycle).await {
                        Ok(Ok(results)) => Some(results),
                        Ok(Err(error)) => {
                            warn!(error = %error, "refresh cycle task failed during shutdown");
                            None
                        }
                        Err(_) => {
                            cycle.abort();
                            debug!("in-flight cycle aborted after shutdown grace period");
                            None
                        }
                    }
                }
            };

            if let Some(results) = results {
                if let Err(error) = self.sink.publish(results).await {
                    warn!(error = %error, "result publish failed");
                }
            }

            if shutdown.is_triggered() {
                break;
            }
            if !sleep_or_shutdown(delay, &shutdown).await {
                break;
            }
        }
        debug!("scheduler stopped");
        Ok(())
    }

    /// Fetch one snapshot, run one cycle, publish, and return.
    ///
    /// Unlike [`run`](Self::run), a fetch or publish failure is surfaced to
    /// the caller here; with a single cycle there is no next tick to retry
    /// on.
    pub async fn run_once(&self) -> anyhow::Result<()> {
        let snapshot = self.source.fetch().await?;
        let results = run_cycle(
            Arc::clone(&self.executor),
            Arc::clone(&self.secrets),
            snapshot,
            self.concurrency,
        )
        .await;
        self.sink.publish(results).await
    }
}

/// Execute one full cycle: every query in the snapshot through a bounded
/// concurrent fan-out, results row-aligned with the query list.
///
/// Each query runs in its own task, so a panic is contained and recorded as
/// an unclassified failure for that row only.
pub async fn run_cycle(
    executor: Arc<QueryExecutor>,
    secrets: Arc<SecretMap>,
    snapshot: ConfigSnapshot,
    concurrency: usize,
) -> Vec<QueryResult> {
    let query_tasks = snapshot
        .queries
        .into_iter()
        .enumerate()
        .map(|(row, descriptor)| {
            let executor = Arc::clone(&executor);
            let secrets = Arc::clone(&secrets);
            async move {
                let task = tokio::spawn(async move {
                    runner::run_query(&executor, &descriptor, &secrets).await
                });
                match task.await {
                    Ok(result) => result,
                    Err(error) => {
                        warn!(row, error = %error, "query task failed");
                        QueryResult::unclassified(error.to_string())
                    }
                }
            }
        });
    futures::stream::iter(query_tasks)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

fn jittered_delay(interval_secs: u64, jitter_secs: u64) -> Duration {
    let jitter = rand::rng().random_range(0..=jitter_secs);
    Duration::from_secs(interval_secs.saturating_add(jitter))
}

/// Sleep for `delay`, returning false if shutdown fired first.
async fn sleep_or_shutdown(delay: Duration, shutdown: &ShutdownToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown.triggered() => false,
    }
}
