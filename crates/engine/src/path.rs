//! Path query evaluation over JSON documents.
//!
//! Thin adapter over `serde_json_path` (RFC 9535 JSONPath: wildcards,
//! recursive descent, filters, slices, unions). The adapter decides whether
//! a query is *singular* (addresses exactly one fixed node) or inherently
//! multi-valued, and shapes the result accordingly: singular queries yield a
//! scalar, everything else yields a table.

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::error::{EngineError, Result};

/// Value produced by path extraction: a single scalar or an ordered table.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Scalar(Value),
    Table(Vec<Value>),
}

impl Extracted {
    /// Table length for result records: element count for tables, -1 for
    /// scalars.
    pub fn table_len(&self) -> i64 {
        match self {
            Self::Table(rows) => rows.len() as i64,
            Self::Scalar(_) => -1,
        }
    }

    /// True if this extraction is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    /// Convert into a plain JSON value; tables become arrays.
    pub fn into_value(self) -> Value {
        match self {
            Self::Scalar(value) => value,
            Self::Table(rows) => Value::Array(rows),
        }
    }
}

/// Evaluate `query` against `document`.
///
/// Evaluation is pure: the same query on the same document always yields the
/// same extraction. A singular query that matches nothing (including
/// structurally invalid application, e.g. indexing into a non-container) is
/// a [`EngineError::PathEvaluation`]; malformed query text is a
/// [`EngineError::PathSyntax`].
pub fn evaluate(document: &Value, query: &str) -> Result<Extracted> {
    let path = JsonPath::parse(query).map_err(|e| EngineError::PathSyntax(e.to_string()))?;
    let nodes: Vec<Value> = path.query(document).all().into_iter().cloned().collect();
    if is_singular(query) {
        match nodes.into_iter().next() {
            Some(node) => Ok(Extracted::Scalar(node)),
            None => Err(EngineError::PathEvaluation(format!(
                "path {query:?} matched nothing in the document"
            ))),
        }
    } else {
        Ok(Extracted::Table(nodes))
    }
}

/// A query is singular when every selector addresses at most one node: no
/// wildcard, recursive descent, filter, slice, or union selector. Quoted
/// name selectors are skipped so `$['a:b']` stays singular.
fn is_singular(query: &str) -> bool {
    let bytes = query.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'*' => return false,
                b'.' if bytes.get(i + 1) == Some(&b'.') => return false,
                b'?' | b':' | b',' => return false,
                _ => {}
            },
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "items": [
                {"price": 1, "name": "a"},
                {"price": 2, "name": "b"},
                {"price": 3, "name": "c"}
            ],
            "total": 6,
            "meta": {"next": null}
        })
    }

    #[test]
    fn test_singular_query_yields_scalar() {
        let extracted = evaluate(&doc(), "$.total").unwrap();
        assert_eq!(extracted, Extracted::Scalar(json!(6)));
        assert_eq!(extracted.table_len(), -1);
    }

    #[test]
    fn test_indexed_query_is_singular() {
        let extracted = evaluate(&doc(), "$.items[0].price").unwrap();
        assert_eq!(extracted, Extracted::Scalar(json!(1)));
    }

    #[test]
    fn test_wildcard_query_yields_table() {
        let extracted = evaluate(&doc(), "$.items[*].price").unwrap();
        assert_eq!(extracted, Extracted::Table(vec![json!(1), json!(2), json!(3)]));
        assert_eq!(extracted.table_len(), 3);
    }

    #[test]
    fn test_recursive_descent_yields_table() {
        let extracted = evaluate(&doc(), "$..price").unwrap();
        assert!(extracted.is_table());
    }

    #[test]
    fn test_filter_query_yields_table() {
        let extracted = evaluate(&doc(), "$.items[?@.price > 1].name").unwrap();
        assert_eq!(extracted, Extracted::Table(vec![json!("b"), json!("c")]));
    }

    #[test]
    fn test_multi_valued_query_may_be_empty() {
        let extracted = evaluate(&doc(), "$.missing[*]").unwrap();
        assert_eq!(extracted, Extracted::Table(vec![]));
    }

    #[test]
    fn test_singular_query_without_match_fails() {
        let err = evaluate(&doc(), "$.missing").unwrap_err();
        assert!(matches!(err, EngineError::PathEvaluation(_)));
    }

    #[test]
    fn test_indexing_a_non_container_fails() {
        let err = evaluate(&doc(), "$.total[0]").unwrap_err();
        assert!(matches!(err, EngineError::PathEvaluation(_)));
    }

    #[test]
    fn test_malformed_query_is_a_syntax_error() {
        let err = evaluate(&doc(), "$.[").unwrap_err();
        assert!(matches!(err, EngineError::PathSyntax(message) if !message.is_empty()));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let document = doc();
        let first = evaluate(&document, "$.items[*].price").unwrap();
        let second = evaluate(&document, "$.items[*].price").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_singular_detection() {
        assert!(is_singular("$.a.b"));
        assert!(is_singular("$.a[0]"));
        assert!(is_singular("$['a:b']"));
        assert!(!is_singular("$.a[*]"));
        assert!(!is_singular("$..a"));
        assert!(!is_singular("$.a[1:3]"));
        assert!(!is_singular("$.a[0,1]"));
        assert!(!is_singular("$.items[?@.price > 1]"));
    }
}
