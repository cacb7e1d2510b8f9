//! Query execution and aggregation engine for fetchboard.
//!
//! This crate turns declarative REST query descriptors into typed result
//! records: secret resolution, HTTP execution with pagination, path-query
//! extraction, aggregation, and the refresh scheduler that runs the whole
//! query set on a jittered interval with per-query failure isolation.

pub mod aggregate;
pub mod error;
pub mod executor;
pub mod models;
pub mod path;
pub mod runner;
pub mod scheduler;
pub mod secrets;
mod shutdown;

pub use aggregate::AggregatorKind;
pub use error::{EngineError, Result, codes};
pub use executor::{QueryExecutor, QueryExecutorBuilder};
pub use models::{
    ConfigSnapshot, PaginationSpec, QueryDescriptor, QueryResult, RequestSpec, ResponseSpec,
};
pub use path::Extracted;
pub use runner::run_query;
pub use scheduler::{ConfigSource, ResultSink, Scheduler};
pub use shutdown::ShutdownToken;
