//! Common test utilities for engine integration tests.
//!
//! Provides shared helper functions and re-exports commonly used types for
//! testing the query engine against a mock HTTP server.

use std::time::Duration;

use fetchboard_engine::{
    PaginationSpec, QueryDescriptor, QueryExecutor, RequestSpec, ResponseSpec,
};

// Re-export commonly used types for test convenience.
// These are used via `use common::*;` in test files.
#[allow(unused_imports)]
pub use fetchboard_config::SecretMap;
#[allow(unused_imports)]
pub use serde_json::json;
#[allow(unused_imports)]
pub use wiremock::matchers::{body_json, header, method, path, query_param};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Executor with short timeout and small page cap suitable for tests.
#[allow(dead_code)]
pub fn test_executor() -> QueryExecutor {
    QueryExecutor::builder()
        .timeout(Duration::from_secs(5))
        .max_pages(5)
        .build()
        .expect("executor should build")
}

/// Minimal GET/POST descriptor with no response spec or aggregator.
#[allow(dead_code)]
pub fn descriptor(http_method: &str, url: impl Into<String>, path_query: &str) -> QueryDescriptor {
    QueryDescriptor {
        method: http_method.to_string(),
        url: url.into(),
        request: RequestSpec::default(),
        response: None,
        path_query: path_query.to_string(),
        aggregator: None,
    }
}

/// Response spec following `next_path` pagination links, no data path.
#[allow(dead_code)]
pub fn paginated(next_path: &str) -> Option<ResponseSpec> {
    Some(ResponseSpec {
        data_path: None,
        pagination: Some(PaginationSpec {
            next_path: next_path.to_string(),
        }),
    })
}
