//! Run lookup tests
//!
//! Time columns answer "what was the state at time t" with the last point
//! not after t; quality columns answer "when was quality q reached" with the
//! first point at least as good as q.

use std::sync::Arc;

use bench_data::context::DimensionBuilder;
use bench_data::dimension::{Dimension, DimensionDirection, DimensionSet, DimensionType};
use bench_data::storage::{DataFactory, DataPoint, DataPointRef, NumericValue, PrimitiveType};
use bench_data::{Error, Result, Run};

// =============================================================================
// Fixtures
// =============================================================================

fn dimension(
    name: &str,
    primitive_type: PrimitiveType,
    dimension_type: DimensionType,
    direction: DimensionDirection,
) -> Result<Dimension> {
    let ctx = DimensionBuilder::context();
    ctx.open()?;
    ctx.set_name(name)?;
    ctx.set_primitive_type(primitive_type)?;
    ctx.set_dimension_type(dimension_type)?;
    ctx.set_direction(direction)?;
    ctx.finish()
}

/// `t`: long, increasing, time measure. `q`: double, strictly decreasing,
/// quality measure.
fn time_and_quality() -> Arc<DimensionSet> {
    Arc::new(
        DimensionSet::new(vec![
            dimension(
                "t",
                PrimitiveType::Long,
                DimensionType::RuntimeCpu,
                DimensionDirection::Increasing,
            )
            .unwrap(),
            dimension(
                "q",
                PrimitiveType::Double,
                DimensionType::QualityProblemDependent,
                DimensionDirection::DecreasingStrictly,
            )
            .unwrap(),
        ])
        .unwrap(),
    )
}

fn run(dimensions: &DimensionSet, rows: &[&str]) -> Result<Run> {
    let factory = dimensions.factory();
    let points = rows
        .iter()
        .map(|row| factory.parse_string(row))
        .collect::<Result<Vec<_>>>()?;
    factory.create_run(points)
}

fn pair(point: Option<&DataPointRef>) -> Option<(i64, f64)> {
    point.map(|p| (p.get_long(0), p.get_double(1)))
}

// =============================================================================
// Reference run: (0,10.0), (5,7.0), (9,7.0), (20,3.0)
// =============================================================================

#[test]
fn test_quality_exact_match_returns_earliest() {
    let dims = time_and_quality();
    let run = run(&dims, &["0 10.0", "5 7.0", "9 7.0", "20 3.0"]).unwrap();
    assert_eq!(pair(run.find_double(1, 7.0)), Some((5, 7.0)));
}

#[test]
fn test_time_floor() {
    let dims = time_and_quality();
    let run = run(&dims, &["0 10.0", "5 7.0", "9 7.0", "20 3.0"]).unwrap();
    assert_eq!(pair(run.find_long(0, 6)), Some((5, 7.0)));
    assert_eq!(pair(run.find_long(0, 9)), Some((9, 7.0)));
    assert_eq!(pair(run.find_long(0, 0)), Some((0, 10.0)));
}

#[test]
fn test_quality_optimistic_neighbor() {
    let dims = time_and_quality();
    let run = run(&dims, &["0 10.0", "5 7.0", "9 7.0", "20 3.0"]).unwrap();
    assert_eq!(pair(run.find_double(1, 5.0)), Some((20, 3.0)));
}

#[test]
fn test_out_of_range_queries() {
    let dims = time_and_quality();
    let run = run(&dims, &["0 10.0", "5 7.0", "9 7.0", "20 3.0"]).unwrap();
    // before the first time stamp nothing was recorded yet
    assert_eq!(pair(run.find_long(0, -3)), None);
    // after the last one the final state persists
    assert_eq!(pair(run.find_long(0, 1_000)), Some((20, 3.0)));
    // never reached
    assert_eq!(pair(run.find_double(1, 2.5)), None);
    // reached immediately
    assert_eq!(pair(run.find_double(1, 50.0)), Some((0, 10.0)));
}

#[test]
fn test_query_value_is_cast_to_column_type() {
    let dims = time_and_quality();
    let run = run(&dims, &["0 10.0", "5 7.0", "9 7.0", "20 3.0"]).unwrap();
    assert_eq!(
        pair(run.find(0, NumericValue::Double(9.75))),
        Some((9, 7.0))
    );
    assert_eq!(pair(run.find(1, NumericValue::Int(7))), Some((5, 7.0)));
}

#[test]
fn test_points_are_sorted_on_construction() {
    let dims = time_and_quality();
    let run = run(&dims, &["20 3.0", "5 7.0", "0 10.0", "9 7.0"]).unwrap();
    assert_eq!(pair(Some(run.first())), Some((0, 10.0)));
    assert_eq!(pair(Some(run.last())), Some((20, 3.0)));
    assert_eq!(run.len(), 4);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_quality_regression_rejected() {
    let dims = time_and_quality();
    let result = run(&dims, &["0 10.0", "5 12.0"]);
    assert!(matches!(result, Err(Error::RunOrder { .. })));
}

#[test]
fn test_empty_run_rejected() {
    let dims = time_and_quality();
    let result = dims.factory().create_run(Vec::new());
    assert!(matches!(result, Err(Error::EmptySet(_))));
}

#[test]
fn test_malformed_row_names_token() {
    let dims = time_and_quality();
    match dims.factory().parse_string("5 seven") {
        Err(Error::Parse { input, message, .. }) => {
            assert_eq!(input, "seven");
            assert!(message.contains("'q'"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_wrong_arity_rejected() {
    let dims = time_and_quality();
    assert!(dims.factory().parse_string("5").is_err());
    assert!(dims.factory().parse_string("5 1.0 2.0").is_err());
}

#[test]
fn test_long_columns_keep_full_precision() {
    let dims = time_and_quality();
    let run = run(&dims, &["9007199254740993 1.0"]).unwrap();
    let point = run.first();
    assert_eq!(point.get_long(0), 9_007_199_254_740_993);
    assert_eq!(point.get(0), NumericValue::Long(9_007_199_254_740_993));
}
