//! Per-query orchestration: resolve, request, extract, aggregate, package.
//!
//! The runner is the single boundary guaranteeing that one query's failure
//! never propagates: every error raised by any step is converted into an
//! error result record here, and success records are assembled with timing
//! and size information.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use fetchboard_config::SecretMap;

use crate::aggregate::{self, AggregatorKind};
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::models::{QueryDescriptor, QueryResult};
use crate::path::{self, Extracted};
use crate::secrets;

/// Run one query end-to-end and package the outcome.
///
/// Infallible at this boundary: failures become error records carrying the
/// taxonomy code. No step is retried; retries belong to the scheduler's next
/// tick.
pub async fn run_query(
    executor: &QueryExecutor,
    descriptor: &QueryDescriptor,
    secrets: &SecretMap,
) -> QueryResult {
    let started_at = Utc::now();
    match execute_steps(executor, descriptor, secrets).await {
        Ok((value, length)) => QueryResult::success(value, length, started_at),
        Err(error) => {
            debug!(url = %descriptor.url, error = %error, "query failed");
            QueryResult::failure(&error, started_at)
        }
    }
}

async fn execute_steps(
    executor: &QueryExecutor,
    descriptor: &QueryDescriptor,
    secrets: &SecretMap,
) -> Result<(Value, i64)> {
    let resolved = secrets::resolve_request(&descriptor.request, secrets)?;
    let units = executor.execute(descriptor, &resolved).await?;
    let extracted = extract_units(&units, &descriptor.path_query)?;
    let length = extracted.table_len();
    let value = match &descriptor.aggregator {
        Some(name) => {
            let kind: AggregatorKind = name.parse()?;
            aggregate::apply(kind, &extracted)?
        }
        None => extracted.into_value(),
    };
    Ok((value, length))
}

/// Evaluate the path query against each accumulated page unit.
///
/// A single unit preserves the scalar/table shape of its extraction;
/// multiple units concatenate into one table, a scalar per-unit result
/// contributing one element.
fn extract_units(units: &[Value], query: &str) -> Result<Extracted> {
    if let [unit] = units {
        return path::evaluate(unit, query);
    }
    let mut rows = Vec::new();
    for unit in units {
        match path::evaluate(unit, query)? {
            Extracted::Table(mut page_rows) => rows.append(&mut page_rows),
            Extracted::Scalar(value) => rows.push(value),
        }
    }
    Ok(Extracted::Table(rows))
}
