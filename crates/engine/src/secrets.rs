//! Secret reference substitution for request specifications.
//!
//! A string value exactly equal to `$NAME` is a placeholder for the secret
//! named `NAME`; all other values, including partial matches such as
//! `prefix$NAME`, are literal. Substitution walks nested JSON structure, so
//! references work inside the request body as well as headers and
//! parameters.

use serde_json::Value;

use fetchboard_config::SecretMap;

use crate::error::{EngineError, Result};
use crate::models::RequestSpec;

/// A request specification with all secret references substituted, ready for
/// the HTTP executor.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRequest {
    pub data: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub parameters: Vec<(String, String)>,
}

/// Resolve every secret reference in a request specification.
///
/// Fails with [`EngineError::UnknownSecret`] when a referenced name is absent
/// from the map; this fails the one query, never the process.
pub fn resolve_request(spec: &RequestSpec, secrets: &SecretMap) -> Result<ResolvedRequest> {
    let data = spec
        .data
        .as_ref()
        .map(|value| resolve_value(value, secrets))
        .transpose()?;
    let headers = resolve_pairs(spec.headers.as_ref(), secrets)?;
    let parameters = resolve_pairs(spec.parameters.as_ref(), secrets)?;
    Ok(ResolvedRequest {
        data,
        headers,
        parameters,
    })
}

/// Resolve secret references in an arbitrary JSON value, returning an
/// equivalent structure. Object keys are always literal.
pub fn resolve_value(value: &Value, secrets: &SecretMap) -> Result<Value> {
    match value {
        Value::String(s) => resolve_string(s, secrets).map(Value::String),
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_value(item, secrets))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, item)| Ok((key.clone(), resolve_value(item, secrets)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

fn resolve_pairs(
    pairs: Option<&std::collections::BTreeMap<String, String>>,
    secrets: &SecretMap,
) -> Result<Vec<(String, String)>> {
    pairs
        .map(|map| {
            map.iter()
                .map(|(name, value)| Ok((name.clone(), resolve_string(value, secrets)?)))
                .collect()
        })
        .transpose()
        .map(Option::unwrap_or_default)
}

fn resolve_string(raw: &str, secrets: &SecretMap) -> Result<String> {
    match raw.strip_prefix('$') {
        Some(name) => secrets
            .get(name)
            .map(str::to_string)
            .ok_or_else(|| EngineError::UnknownSecret(name.to_string())),
        None => Ok(raw.to_string()),
    }
}
