//! Aggregation operators over extracted tables.
//!
//! Every operator requires a table input; all except `COUNT` additionally
//! require every element to be a JSON number. Empty-table policy: `COUNT`
//! and `SUM` have well-defined identities (0); the remaining operators have
//! no meaningful sentinel and fail with a type error.

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};

use crate::error::{EngineError, Result};
use crate::path::Extracted;

/// The eight supported aggregation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorKind {
    Avg,
    Count,
    Max,
    Med,
    Min,
    Stdev,
    Sum,
    Var,
}

impl FromStr for AggregatorKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVG" => Ok(Self::Avg),
            "COUNT" => Ok(Self::Count),
            "MAX" => Ok(Self::Max),
            "MED" => Ok(Self::Med),
            "MIN" => Ok(Self::Min),
            "STDEV" => Ok(Self::Stdev),
            "SUM" => Ok(Self::Sum),
            "VAR" => Ok(Self::Var),
            _ => Err(EngineError::UnknownAggregator(s.to_string())),
        }
    }
}

impl fmt::Display for AggregatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Avg => "AVG",
            Self::Count => "COUNT",
            Self::Max => "MAX",
            Self::Med => "MED",
            Self::Min => "MIN",
            Self::Stdev => "STDEV",
            Self::Sum => "SUM",
            Self::Var => "VAR",
        };
        f.write_str(name)
    }
}

/// Reduce an extracted table to a scalar.
pub fn apply(kind: AggregatorKind, values: &Extracted) -> Result<Value> {
    let rows = match values {
        Extracted::Table(rows) => rows,
        Extracted::Scalar(value) => {
            return Err(EngineError::AggregationType(format!(
                "{kind} requires a table, got scalar {value}"
            )));
        }
    };
    if kind == AggregatorKind::Count {
        return Ok(json!(rows.len()));
    }

    let nums = numeric_rows(kind, rows)?;
    if nums.is_empty() {
        return match kind {
            AggregatorKind::Sum => Ok(json!(0.0)),
            _ => Err(EngineError::AggregationType(format!(
                "{kind} is undefined on an empty table"
            ))),
        };
    }

    let reduced = match kind {
        AggregatorKind::Avg => mean(&nums),
        AggregatorKind::Max => nums.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregatorKind::Med => median(nums),
        AggregatorKind::Min => nums.iter().copied().fold(f64::INFINITY, f64::min),
        AggregatorKind::Stdev => variance(&nums).sqrt(),
        AggregatorKind::Sum => nums.iter().sum(),
        AggregatorKind::Var => variance(&nums),
        AggregatorKind::Count => unreachable!("COUNT is handled before numeric conversion"),
    };
    if !reduced.is_finite() {
        return Err(EngineError::AggregationArithmetic(format!(
            "{kind} reduced to a non-finite value"
        )));
    }
    Ok(json!(reduced))
}

fn numeric_rows(kind: AggregatorKind, rows: &[Value]) -> Result<Vec<f64>> {
    rows.iter()
        .map(|value| {
            value.as_f64().ok_or_else(|| {
                EngineError::AggregationType(format!(
                    "{kind} requires numeric elements, got {value}"
                ))
            })
        })
        .collect()
}

fn mean(nums: &[f64]) -> f64 {
    nums.iter().sum::<f64>() / nums.len() as f64
}

/// Standard median: the middle element, or the mean of the two middle
/// elements for even-length input.
fn median(mut nums: Vec<f64>) -> f64 {
    nums.sort_by(f64::total_cmp);
    let mid = nums.len() / 2;
    if nums.len() % 2 == 1 {
        nums[mid]
    } else {
        (nums[mid - 1] + nums[mid]) / 2.0
    }
}

/// Population variance; a single element yields 0.
fn variance(nums: &[f64]) -> f64 {
    let mean = mean(nums);
    nums.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / nums.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;

    fn table(nums: &[f64]) -> Extracted {
        Extracted::Table(nums.iter().map(|n| json!(n)).collect())
    }

    #[test]
    fn test_operator_parsing_is_case_insensitive() {
        assert_eq!("SUM".parse::<AggregatorKind>().unwrap(), AggregatorKind::Sum);
        assert_eq!("avg".parse::<AggregatorKind>().unwrap(), AggregatorKind::Avg);
        assert_eq!(
            " stdev ".parse::<AggregatorKind>().unwrap(),
            AggregatorKind::Stdev
        );
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = "FIRST".parse::<AggregatorKind>().unwrap_err();
        assert_eq!(err.wire_code(), codes::UNKNOWN_AGGREGATOR);
    }

    #[test]
    fn test_sum_avg_min_max() {
        let values = table(&[1.0, 2.0, 3.0]);
        assert_eq!(apply(AggregatorKind::Sum, &values).unwrap(), json!(6.0));
        assert_eq!(apply(AggregatorKind::Avg, &values).unwrap(), json!(2.0));
        assert_eq!(apply(AggregatorKind::Min, &values).unwrap(), json!(1.0));
        assert_eq!(apply(AggregatorKind::Max, &values).unwrap(), json!(3.0));
    }

    #[test]
    fn test_count_accepts_any_table() {
        let values = Extracted::Table(vec![json!("a"), json!(null), json!(2)]);
        assert_eq!(apply(AggregatorKind::Count, &values).unwrap(), json!(3));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(
            apply(AggregatorKind::Med, &table(&[3.0, 1.0, 2.0])).unwrap(),
            json!(2.0)
        );
        assert_eq!(
            apply(AggregatorKind::Med, &table(&[4.0, 1.0, 2.0, 3.0])).unwrap(),
            json!(2.5)
        );
    }

    #[test]
    fn test_variance_and_stdev() {
        let values = table(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(apply(AggregatorKind::Var, &values).unwrap(), json!(4.0));
        assert_eq!(apply(AggregatorKind::Stdev, &values).unwrap(), json!(2.0));
    }

    #[test]
    fn test_single_element_dispersion_is_zero() {
        let values = table(&[42.0]);
        assert_eq!(apply(AggregatorKind::Var, &values).unwrap(), json!(0.0));
        assert_eq!(apply(AggregatorKind::Stdev, &values).unwrap(), json!(0.0));
    }

    #[test]
    fn test_empty_table_policy() {
        let empty = Extracted::Table(vec![]);
        assert_eq!(apply(AggregatorKind::Count, &empty).unwrap(), json!(0));
        assert_eq!(apply(AggregatorKind::Sum, &empty).unwrap(), json!(0.0));
        for kind in [
            AggregatorKind::Avg,
            AggregatorKind::Max,
            AggregatorKind::Med,
            AggregatorKind::Min,
            AggregatorKind::Stdev,
            AggregatorKind::Var,
        ] {
            let err = apply(kind, &empty).unwrap_err();
            assert_eq!(err.wire_code(), codes::AGGREGATION_TYPE, "{kind}");
        }
    }

    #[test]
    fn test_scalar_input_is_a_type_error() {
        let err = apply(AggregatorKind::Sum, &Extracted::Scalar(json!(5))).unwrap_err();
        assert_eq!(err.wire_code(), codes::AGGREGATION_TYPE);
    }

    #[test]
    fn test_non_numeric_elements_are_a_type_error() {
        let values = Extracted::Table(vec![json!(1), json!("two")]);
        let err = apply(AggregatorKind::Sum, &values).unwrap_err();
        assert_eq!(err.wire_code(), codes::AGGREGATION_TYPE);
    }

    #[test]
    fn test_overflow_is_an_arithmetic_error() {
        let values = table(&[f64::MAX, f64::MAX]);
        let err = apply(AggregatorKind::Sum, &values).unwrap_err();
        assert_eq!(err.wire_code(), codes::AGGREGATION_ARITHMETIC);
    }
}
