//! HTTP query execution with pagination.
//!
//! Responsibilities:
//! - Build and issue one HTTP request per page from a query descriptor and a
//!   resolved request specification.
//! - Follow pagination links and accumulate page payloads in order.
//! - Short-circuit on error statuses, reporting the upstream status verbatim.
//!
//! Does NOT handle:
//! - Secret resolution (callers pass an already-resolved request).
//! - Extraction of the final value or aggregation (see `runner`).
//!
//! Invariants:
//! - Method and URL validation happen before any network I/O.
//! - Pagination always terminates: a visited-URL set stops cycles and the
//!   page cap bounds chain length; both are soft stops that keep the pages
//!   already accumulated.
//! - Every request carries the client-wide timeout.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use fetchboard_config::EngineSettings;
use fetchboard_config::constants::{DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS};

use crate::error::{EngineError, Result};
use crate::models::QueryDescriptor;
use crate::path::{self, Extracted};
use crate::secrets::ResolvedRequest;

/// Executes descriptor-defined HTTP queries, following pagination.
#[derive(Debug)]
pub struct QueryExecutor {
    http: reqwest::Client,
    max_pages: usize,
}

impl QueryExecutor {
    /// Create a new executor builder.
    pub fn builder() -> QueryExecutorBuilder {
        QueryExecutorBuilder::new()
    }

    /// Create an executor from engine settings.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        Self::builder()
            .timeout(settings.timeout)
            .max_pages(settings.max_pages)
            .build()
    }

    /// Execute one query, returning the ordered page payload units.
    ///
    /// With a `data_path` configured, each page contributes its extracted
    /// payload (a table extraction contributes its elements); without one,
    /// each raw page body is one unit.
    pub async fn execute(
        &self,
        descriptor: &QueryDescriptor,
        request: &ResolvedRequest,
    ) -> Result<Vec<Value>> {
        let method = parse_method(&descriptor.method)?;
        let response_spec = descriptor.response.as_ref();
        let data_path = response_spec.and_then(|r| r.data_path.as_deref());
        let next_path = response_spec
            .and_then(|r| r.pagination.as_ref())
            .map(|p| p.next_path.as_str());

        let mut current = Url::parse(&descriptor.url)
            .map_err(|e| EngineError::InvalidUrl(format!("{}: {e}", descriptor.url)))?;
        let mut units = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut page_count = 0usize;

        loop {
            if page_count >= self.max_pages {
                debug!(
                    max_pages = self.max_pages,
                    url = %current,
                    "page cap reached, stopping pagination"
                );
                break;
            }
            if !visited.insert(current.to_string()) {
                debug!(url = %current, "pagination chain revisited a page, stopping");
                break;
            }

            let first_page = page_count == 0;
            let body = self
                .fetch_page(method.clone(), &current, request, first_page)
                .await?;
            page_count += 1;

            let next_url = match next_path {
                Some(next_path) => next_page_url(&body, next_path, &current)?,
                None => None,
            };

            match data_path {
                Some(data_path) => match path::evaluate(&body, data_path)? {
                    Extracted::Table(rows) => units.extend(rows),
                    Extracted::Scalar(value) => units.push(value),
                },
                None => units.push(body),
            }

            match next_url {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(units)
    }

    async fn fetch_page(
        &self,
        method: Method,
        url: &Url,
        request: &ResolvedRequest,
        first_page: bool,
    ) -> Result<Value> {
        let mut builder = self.http.request(method, url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // Follow-up URLs carry their own query string; only the first page
        // gets the configured parameters.
        if first_page && !request.parameters.is_empty() {
            builder = builder.query(&request.parameters);
        }
        if let Some(data) = &request.data {
            builder = builder.json(data);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        if status >= 400 {
            let url = response.url().to_string();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "error response body was unreadable".to_string());
            return Err(EngineError::HttpStatus {
                status,
                url,
                message,
            });
        }
        Ok(response.json().await?)
    }
}

/// Builder for creating a [`QueryExecutor`].
pub struct QueryExecutorBuilder {
    timeout: Duration,
    max_pages: usize,
}

impl Default for QueryExecutorBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl QueryExecutorBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout, applied to every pagination hop.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of pages followed per query. Values below 1
    /// are clamped to 1 so every query fetches at least its first page.
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Build the executor.
    pub fn build(self) -> Result<QueryExecutor> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(QueryExecutor {
            http,
            max_pages: self.max_pages.max(1),
        })
    }
}

fn parse_method(raw: &str) -> Result<Method> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        _ => Err(EngineError::InvalidMethod(raw.to_string())),
    }
}

/// Locate the next-page URL in a page body.
///
/// A scalar string is followed, as is the first string element of a table;
/// anything else (absent, null, empty string, non-string) ends the chain.
/// Relative links are joined against the current page URL.
fn next_page_url(body: &Value, next_path: &str, current: &Url) -> Result<Option<Url>> {
    let extracted = match path::evaluate(body, next_path) {
        Ok(extracted) => extracted,
        // A singular next-path that matches nothing just means the chain is
        // over; it is not a query failure.
        Err(EngineError::PathEvaluation(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    let target = match extracted {
        Extracted::Scalar(Value::String(s)) if !s.is_empty() => s,
        Extracted::Table(rows) => match rows.into_iter().next() {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };
    current
        .join(&target)
        .map(Some)
        .map_err(|e| EngineError::InvalidUrl(format!("{target}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_method_accepts_get_and_post() {
        assert_eq!(parse_method("GET").unwrap(), Method::GET);
        assert_eq!(parse_method("post").unwrap(), Method::POST);
        assert_eq!(parse_method(" Get ").unwrap(), Method::GET);
    }

    #[test]
    fn test_parse_method_rejects_everything_else() {
        for raw in ["PUT", "DELETE", "G E T", ""] {
            assert!(matches!(
                parse_method(raw),
                Err(EngineError::InvalidMethod(_))
            ));
        }
    }

    #[test]
    fn test_next_page_url_follows_scalar_string() {
        let current = Url::parse("https://example.test/items?page=1").unwrap();
        let body = json!({"next": "https://example.test/items?page=2"});
        let next = next_page_url(&body, "$.next", &current).unwrap().unwrap();
        assert_eq!(next.as_str(), "https://example.test/items?page=2");
    }

    #[test]
    fn test_next_page_url_joins_relative_links() {
        let current = Url::parse("https://example.test/api/items").unwrap();
        let body = json!({"next": "/api/items?page=2"});
        let next = next_page_url(&body, "$.next", &current).unwrap().unwrap();
        assert_eq!(next.as_str(), "https://example.test/api/items?page=2");
    }

    #[test]
    fn test_next_page_url_stops_on_absent_null_or_empty() {
        let current = Url::parse("https://example.test/items").unwrap();
        for body in [json!({}), json!({"next": null}), json!({"next": ""})] {
            assert!(next_page_url(&body, "$.next", &current).unwrap().is_none());
        }
    }

    #[test]
    fn test_next_page_url_takes_first_table_element() {
        let current = Url::parse("https://example.test/items").unwrap();
        let body = json!({"links": [{"next": "https://example.test/p2"}]});
        let next = next_page_url(&body, "$.links[*].next", &current)
            .unwrap()
            .unwrap();
        assert_eq!(next.as_str(), "https://example.test/p2");
    }

    #[test]
    fn test_builder_clamps_page_cap() {
        let executor = QueryExecutor::builder().max_pages(0).build().unwrap();
        assert_eq!(executor.max_pages, 1);
    }
}
