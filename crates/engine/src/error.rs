//! Error types for the query engine.
//!
//! Failures are represented as [`EngineError`] inside the engine and are
//! converted to the numeric wire codes of the result contract only when a
//! [`QueryResult`](crate::models::QueryResult) record is built.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Numeric error codes reported on result records.
///
/// HTTP error statuses (4xx/5xx) are passed through verbatim and therefore
/// have no constant here.
pub mod codes {
    /// Query completed successfully.
    pub const SUCCESS: i32 = 0;
    /// Unclassified/unexpected failure.
    pub const UNCLASSIFIED: i32 = -999;
    /// Generic query error (network failures, unknown secrets).
    pub const QUERY: i32 = -100;
    /// Invalid or unsupported HTTP method.
    pub const INVALID_METHOD: i32 = -101;
    /// Invalid URL.
    pub const INVALID_URL: i32 = -102;
    /// Generic path-query error.
    pub const PATH: i32 = -110;
    /// Path-query syntax error.
    pub const PATH_SYNTAX: i32 = -111;
    /// Generic aggregation error.
    pub const AGGREGATION: i32 = -120;
    /// Unknown aggregation operator.
    pub const UNKNOWN_AGGREGATOR: i32 = -121;
    /// Aggregation type mismatch.
    pub const AGGREGATION_TYPE: i32 = -122;
    /// Aggregation arithmetic error.
    pub const AGGREGATION_ARITHMETIC: i32 = -123;
}

/// Errors that can occur while executing one query.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A secret reference named a secret absent from the secret map.
    #[error("Unknown secret: ${0}")]
    UnknownSecret(String),

    /// Unsupported or malformed HTTP method string.
    #[error("Invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// Malformed request or pagination URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP transport error (connection failure, timeout, body decode).
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Error status response from the queried service.
    #[error("HTTP status {status} from {url}: {message}")]
    HttpStatus {
        status: u16,
        url: String,
        message: String,
    },

    /// Path query failed to parse.
    #[error("Path query syntax error: {0}")]
    PathSyntax(String),

    /// Path query could not be applied to the document.
    #[error("Path query evaluation error: {0}")]
    PathEvaluation(String),

    /// Aggregation failure that fits no more specific aggregation variant.
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// Unrecognized aggregation operator name.
    #[error("Unknown aggregation operator: {0:?}")]
    UnknownAggregator(String),

    /// Aggregation input was not a table of the required element type.
    #[error("Aggregation type mismatch: {0}")]
    AggregationType(String),

    /// Aggregation reduction produced a non-finite value.
    #[error("Aggregation arithmetic error: {0}")]
    AggregationArithmetic(String),

    /// Failure that fits no other category.
    #[error("Unclassified failure: {0}")]
    Unclassified(String),
}

impl EngineError {
    /// The numeric code this error maps to on the result wire contract.
    ///
    /// Upstream HTTP error statuses are reported verbatim; every other
    /// variant maps to its taxonomy code.
    pub fn wire_code(&self) -> i32 {
        match self {
            Self::UnknownSecret(_) | Self::Network(_) => codes::QUERY,
            Self::InvalidMethod(_) => codes::INVALID_METHOD,
            Self::InvalidUrl(_) => codes::INVALID_URL,
            Self::HttpStatus { status, .. } => i32::from(*status),
            Self::PathSyntax(_) => codes::PATH_SYNTAX,
            Self::PathEvaluation(_) => codes::PATH,
            Self::Aggregation(_) => codes::AGGREGATION,
            Self::UnknownAggregator(_) => codes::UNKNOWN_AGGREGATOR,
            Self::AggregationType(_) => codes::AGGREGATION_TYPE,
            Self::AggregationArithmetic(_) => codes::AGGREGATION_ARITHMETIC,
            Self::Unclassified(_) => codes::UNCLASSIFIED,
        }
    }

    /// True if this error carries a verbatim upstream HTTP status.
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::HttpStatus { .. })
    }
}
