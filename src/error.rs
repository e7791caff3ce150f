//! Error types for bench-data
//!
//! Every failure is reported synchronously at the call that introduced the bad
//! value. Nothing in the crate retries or recovers; a partially built set is
//! never exposed.

use crate::context::State;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// bench-data error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A value handed to a constructor or setter is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A container that must hold at least one element was empty
    #[error("Empty {0}: at least one element is required")]
    EmptySet(String),

    /// Two elements of the same set are equal
    #[error("Duplicate elements in {set}: '{first}' and '{second}' are equal")]
    DuplicateElement {
        /// Path of the set being built
        set: String,
        /// First offending element
        first: String,
        /// Second offending element
        second: String,
    },

    /// Ordering of two elements is ambiguous or contradictory
    #[error("Comparator contract violated in {set} between '{first}' and '{second}': {detail}\nThis indicates a data or parser defect. Please check the input data.")]
    ComparatorContract {
        /// Path of the set being built
        set: String,
        /// Element placed first
        first: String,
        /// Element placed second
        second: String,
        /// What went wrong
        detail: String,
    },

    /// Two experiments cannot be told apart by their parameter settings
    #[error("Experiments '{first}' and '{second}' have equal or subsuming parameter settings")]
    DuplicateParameterSetting {
        /// First experiment
        first: String,
        /// Second experiment
        second: String,
    },

    /// A value or parser does not fit the declared primitive type
    #[error("Type mismatch for {target}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Entity being checked
        target: String,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// A value lies outside the admissible range
    #[error("Value {value} out of range [{lower}, {upper}] for {target}")]
    OutOfRange {
        /// Entity being checked
        target: String,
        /// Offending value
        value: String,
        /// Lower limit
        lower: String,
        /// Upper limit
        upper: String,
    },

    /// A number cannot be represented exactly in the target type
    #[error("Loss of numeric fidelity: {0}")]
    FidelityLoss(String),

    /// Text could not be parsed; alternate strategies are kept as suppressed context
    #[error("Parse error in '{input}': {message}{}", suppressed_suffix(.suppressed))]
    Parse {
        /// Offending substring
        input: String,
        /// Most specific failure
        message: String,
        /// Failures of the other strategies that were tried
        suppressed: Vec<String>,
    },

    /// Two consecutive data points of a run are out of order
    #[error("Data point {after} cannot follow {before}: {detail}")]
    RunOrder {
        /// Predecessor
        before: String,
        /// Successor
        after: String,
        /// What went wrong
        detail: String,
    },

    /// A builder was used in the wrong state
    #[error("Lifecycle error: cannot {operation} {context} in state {actual}, requires {expected}")]
    Lifecycle {
        /// Builder kind
        context: &'static str,
        /// Attempted operation
        operation: &'static str,
        /// Required state
        expected: State,
        /// Current state
        actual: State,
    },

    /// A set-once builder field was assigned twice
    #[error("Field '{field}' of {context} was already set")]
    FieldAlreadySet {
        /// Builder kind
        context: &'static str,
        /// Field name
        field: String,
    },

    /// Compilation attempted before all mandatory fields were supplied
    #[error("Cannot compile {context}: missing required fields [{missing}]")]
    MissingFields {
        /// Builder kind
        context: &'static str,
        /// Missing field names
        missing: String,
    },

    /// A leaf builder was asked to open a nested builder
    #[error("{0} does not allow nested contexts")]
    ChildNotAllowed(&'static str),

    /// A name did not resolve
    #[error("Unknown {kind} '{name}'")]
    NotFound {
        /// Kind of entity looked up
        kind: &'static str,
        /// Name that failed to resolve
        name: String,
    },

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),
}

fn suppressed_suffix(suppressed: &[String]) -> String {
    if suppressed.is_empty() {
        String::new()
    } else {
        format!(" (also tried: {})", suppressed.join("; "))
    }
}

impl Error {
    /// Prefix a parse failure with the column it occurred in, keeping suppressed context.
    #[must_use]
    pub(crate) fn in_column(self, column: &str) -> Self {
        match self {
            Self::Parse {
                input,
                message,
                suppressed,
            } => Self::Parse {
                input,
                message: format!("dimension '{column}': {message}"),
                suppressed,
            },
            other => other,
        }
    }
}
