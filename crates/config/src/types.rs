//! Engine settings shared by the executor, scheduler, and CLI.
//!
//! Responsibilities:
//! - Define the tunable knobs of the query engine (timeout, page cap,
//!   concurrency, shutdown grace).
//! - Provide serialization helpers for `Duration`.
//!
//! Does NOT handle:
//! - Per-tick query-set snapshots (those come from the config-source
//!   collaborator, see the engine crate).
//! - Environment variable parsing (see the `env` module).
//!
//! Invariants:
//! - All duration fields are serialized as seconds (integers).
//! - Default values come from `constants`, not magic numbers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES, DEFAULT_SHUTDOWN_GRACE_SECS, DEFAULT_TIMEOUT_SECS,
};

/// Module for serializing Duration as seconds (integer).
mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Tunable settings of the query engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// HTTP request timeout, applied to every request including pagination
    /// hops (serialized as seconds).
    #[serde(with = "duration_seconds", default = "default_timeout")]
    pub timeout: Duration,
    /// Maximum number of pages followed per query before a soft stop.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Number of queries executed concurrently within one refresh cycle.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Grace period granted to in-flight queries on shutdown (serialized as
    /// seconds).
    #[serde(with = "duration_seconds", default = "default_shutdown_grace")]
    pub shutdown_grace: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS)
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}
