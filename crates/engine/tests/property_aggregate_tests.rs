//! Property-based tests for the aggregation operators.
//!
//! This module uses proptest to verify reduction invariants over arbitrary
//! numeric tables:
//! - SUM matches a plain fold
//! - COUNT matches the table length for any element types
//! - MIN <= MED <= MAX, and AVG lies within [MIN, MAX]
//! - VAR is non-negative and STDEV is its square root

use proptest::prelude::*;
use serde_json::{Value, json};

use fetchboard_engine::aggregate::{self, AggregatorKind};
use fetchboard_engine::path::Extracted;

fn table(nums: &[f64]) -> Extracted {
    Extracted::Table(nums.iter().map(|n| json!(n)).collect())
}

fn apply_f64(kind: AggregatorKind, nums: &[f64]) -> f64 {
    aggregate::apply(kind, &table(nums))
        .unwrap()
        .as_f64()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_sum_matches_plain_fold(nums in prop::collection::vec(-1e6f64..1e6f64, 1..50)) {
        let result = apply_f64(AggregatorKind::Sum, &nums);
        let expected: f64 = nums.iter().sum();
        let tolerance = 1e-6 * expected.abs().max(1.0);
        prop_assert!((result - expected).abs() <= tolerance);
    }

    #[test]
    fn prop_count_matches_length_for_any_elements(values in prop::collection::vec(any::<i32>(), 0..50)) {
        let rows: Vec<Value> = values.iter().map(|v| json!(v)).collect();
        let result = aggregate::apply(AggregatorKind::Count, &Extracted::Table(rows)).unwrap();
        prop_assert_eq!(result, json!(values.len()));
    }

    #[test]
    fn prop_min_med_max_are_ordered(nums in prop::collection::vec(-1e6f64..1e6f64, 1..50)) {
        let min = apply_f64(AggregatorKind::Min, &nums);
        let med = apply_f64(AggregatorKind::Med, &nums);
        let max = apply_f64(AggregatorKind::Max, &nums);
        prop_assert!(min <= med);
        prop_assert!(med <= max);
    }

    #[test]
    fn prop_avg_lies_between_min_and_max(nums in prop::collection::vec(-1e6f64..1e6f64, 1..50)) {
        let min = apply_f64(AggregatorKind::Min, &nums);
        let avg = apply_f64(AggregatorKind::Avg, &nums);
        let max = apply_f64(AggregatorKind::Max, &nums);
        // Allow for floating point rounding at the boundaries.
        prop_assert!(avg >= min - 1e-6);
        prop_assert!(avg <= max + 1e-6);
    }

    #[test]
    fn prop_var_is_nonnegative_and_stdev_is_its_root(nums in prop::collection::vec(-1e3f64..1e3f64, 1..50)) {
        let var = apply_f64(AggregatorKind::Var, &nums);
        let stdev = apply_f64(AggregatorKind::Stdev, &nums);
        prop_assert!(var >= 0.0);
        prop_assert!((stdev * stdev - var).abs() <= 1e-6 * var.max(1.0));
    }
}
