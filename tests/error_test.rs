//! Tests for error types

use bench_data::context::State;
use bench_data::Error;

#[test]
fn test_empty_set_error() {
    let error = Error::EmptySet("run".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Empty run"));
    assert!(error_str.contains("at least one element"));
}

#[test]
fn test_comparator_contract_error() {
    let error = Error::ComparatorContract {
        set: "experiments/hc".to_string(),
        first: "run0".to_string(),
        second: "run1".to_string(),
        detail: "elements compare equal".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Comparator contract violated"));
    assert!(error_str.contains("run0"));
    assert!(error_str.contains("run1"));
    assert!(error_str.contains("Please check the input data"));
}

#[test]
fn test_parse_error_with_suppressed() {
    let error = Error::Parse {
        input: "1e".to_string(),
        message: "not a number".to_string(),
        suppressed: vec!["decimal: invalid digit".to_string(), "hex: no prefix".to_string()],
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Parse error in '1e'"));
    assert!(error_str.contains("also tried: decimal: invalid digit; hex: no prefix"));
}

#[test]
fn test_parse_error_without_suppressed() {
    let error = Error::Parse {
        input: "x".to_string(),
        message: "not a number".to_string(),
        suppressed: Vec::new(),
    };
    assert_eq!(format!("{error}"), "Parse error in 'x': not a number");
}

#[test]
fn test_lifecycle_error() {
    let error = Error::Lifecycle {
        context: "run",
        operation: "update",
        expected: State::Open,
        actual: State::Closed,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("cannot update run"));
    assert!(error_str.contains("state closed"));
    assert!(error_str.contains("requires open"));
}

#[test]
fn test_missing_fields_error() {
    let error = Error::MissingFields {
        context: "dimension",
        missing: "NAME, DIRECTION".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Cannot compile dimension"));
    assert!(error_str.contains("[NAME, DIRECTION]"));
}

#[test]
fn test_out_of_range_error() {
    let error = Error::OutOfRange {
        target: "dimension 'FEs'".to_string(),
        value: "-1".to_string(),
        lower: "1".to_string(),
        upper: "100".to_string(),
    };
    let error_str = format!("{error}");
    assert_eq!(error_str, "Value -1 out of range [1, 100] for dimension 'FEs'");
}

#[test]
fn test_duplicate_parameter_setting_error() {
    let error = Error::DuplicateParameterSetting {
        first: "hc".to_string(),
        second: "hc2".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("'hc'"));
    assert!(error_str.contains("'hc2'"));
    assert!(error_str.contains("subsuming"));
}

#[test]
fn test_not_found_and_child_errors() {
    let error = Error::NotFound {
        kind: "instance",
        name: "tsp-7".to_string(),
    };
    assert_eq!(format!("{error}"), "Unknown instance 'tsp-7'");
    let error = Error::ChildNotAllowed("run");
    assert_eq!(format!("{error}"), "run does not allow nested contexts");
}

#[test]
fn test_errors_compare_by_value() {
    let a = Error::InvalidArgument("x".to_string());
    assert_eq!(a.clone(), a);
    assert_ne!(a, Error::Config("x".to_string()));
}
