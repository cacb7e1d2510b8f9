//! Data model shared by the engine components.
//!
//! Responsibilities:
//! - Define the query descriptor shapes loaded from the config source.
//! - Define the per-tick configuration snapshot.
//! - Define the result record pushed to the sink.
//!
//! Does NOT handle:
//! - Loading or persisting these shapes (collaborator concern).
//! - Error-code mapping logic (see `error::EngineError::wire_code`).
//!
//! Invariants:
//! - A snapshot is immutable for the duration of one refresh cycle.
//! - A result record is written once and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use fetchboard_config::constants::{DEFAULT_INTERVAL_SECS, DEFAULT_JITTER_SECS};

use crate::error::{EngineError, codes};

/// One declarative REST query, as loaded from the config source.
///
/// `method` and `aggregator` stay unparsed strings here: a malformed cell in
/// the source must fail that single query with its taxonomy code at
/// execution time, not poison the whole snapshot at load time. A descriptor
/// is identified by its row index in the snapshot's query list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// HTTP method, `GET` or `POST` (case-insensitive).
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Request body, headers, and query parameters.
    #[serde(default)]
    pub request: RequestSpec,
    /// Where to find the payload and the pagination link in responses.
    #[serde(default)]
    pub response: Option<ResponseSpec>,
    /// Path query applied to the accumulated response payload.
    pub path_query: String,
    /// Optional aggregation operator name (`AVG`, `COUNT`, `MAX`, `MED`,
    /// `MIN`, `STDEV`, `SUM`, `VAR`).
    #[serde(default)]
    pub aggregator: Option<String>,
}

/// Request portion of a query descriptor.
///
/// Any string value exactly equal to `$NAME` is a secret reference resolved
/// before use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestSpec {
    /// JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// URL query parameters, attached to the first page request only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
}

/// Response portion of a query descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Path query locating the payload of interest within each page body;
    /// absent means the whole body.
    #[serde(default)]
    pub data_path: Option<String>,
    /// Pagination settings; absent means single-page.
    #[serde(default)]
    pub pagination: Option<PaginationSpec>,
}

/// Pagination settings of a response specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSpec {
    /// Path query locating the next-page URL within each page body.
    pub next_path: String,
}

/// The configuration snapshot fetched from the config source at the start of
/// each tick and passed down by value, never read as ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Configuration version reported by the source.
    #[serde(default)]
    pub version: u64,
    /// Base interval between refresh cycles in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound of the uniform random jitter added to each interval.
    #[serde(default = "default_jitter_secs")]
    pub jitter_secs: u64,
    /// Ordered query list; result rows align with these indices.
    #[serde(default)]
    pub queries: Vec<QueryDescriptor>,
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_jitter_secs() -> u64 {
    DEFAULT_JITTER_SECS
}

/// Outcome of one query in one refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Final value (post-aggregation when an operator was configured);
    /// absent on failure.
    pub value: Option<Value>,
    /// Byte length of the serialized final value.
    pub size_bytes: u64,
    /// Element count of the extracted (pre-aggregation) table, -1 when the
    /// extraction was not a table.
    pub length: i64,
    /// Numeric error code; 0 on success, an upstream HTTP status or a
    /// taxonomy code on failure.
    pub error_code: i32,
    /// Human-readable failure description; empty on success.
    pub error_message: String,
    /// When query execution began.
    pub started_at: DateTime<Utc>,
    /// When the result record was completed.
    pub finished_at: DateTime<Utc>,
}

impl QueryResult {
    /// Build a success record. `length` is the pre-aggregation table length.
    pub fn success(value: Value, length: i64, started_at: DateTime<Utc>) -> Self {
        let size_bytes = serde_json::to_vec(&value).map(|b| b.len() as u64).unwrap_or(0);
        Self {
            value: Some(value),
            size_bytes,
            length,
            error_code: codes::SUCCESS,
            error_message: String::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Build a failure record from an engine error.
    pub fn failure(error: &EngineError, started_at: DateTime<Utc>) -> Self {
        Self {
            value: None,
            size_bytes: 0,
            length: -1,
            error_code: error.wire_code(),
            error_message: error.to_string(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Build an unclassified-failure record (code -999) for faults caught
    /// outside the runner boundary, e.g. a panicked query task.
    pub fn unclassified(message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            value: None,
            size_bytes: 0,
            length: -1,
            error_code: codes::UNCLASSIFIED,
            error_message: message.into(),
            started_at: now,
            finished_at: now,
        }
    }

    /// True if this record reports success.
    pub fn is_success(&self) -> bool {
        self.error_code == codes::SUCCESS
    }
}
