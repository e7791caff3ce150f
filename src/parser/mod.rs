//! Value parser contract
//!
//! Dimensions read their values through a [`NumberParser`]. The general
//! parsing library is an external collaborator; this module defines the
//! contract and ships the two bounded parsers dimensions need by default.

mod number;

pub use number::{IntegerParser, RealParser};

use std::fmt;
use std::sync::Arc;

use crate::storage::{NumericValue, PrimitiveType};
use crate::Result;

/// Parser producing values of type `T`.
pub trait Parser<T>: Send + Sync + fmt::Debug {
    /// Parse trimmed text into a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) if no strategy accepts the
    /// text, or a validation error if the result is not admissible.
    fn parse_string(&self, text: &str) -> Result<T>;

    /// Check that a value is admissible.
    ///
    /// # Errors
    ///
    /// Returns an error describing why the value is rejected.
    fn validate(&self, value: &T) -> Result<()>;
}

/// Parser for a numeric dimension.
pub trait NumberParser: Parser<NumericValue> {
    /// Primitive type of the values produced.
    fn output_type(&self) -> PrimitiveType;

    /// Accept an already-typed number, converting it exactly to the output
    /// type and validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FidelityLoss`](crate::Error::FidelityLoss) if the
    /// conversion loses information, or a validation error.
    fn parse_number(&self, value: NumericValue) -> Result<NumericValue>;

    /// Inclusive lower bound as `i64`.
    fn lower_bound_long(&self) -> i64;

    /// Inclusive upper bound as `i64`.
    fn upper_bound_long(&self) -> i64;

    /// Inclusive lower bound as `f64`.
    fn lower_bound_double(&self) -> f64;

    /// Inclusive upper bound as `f64`.
    fn upper_bound_double(&self) -> f64;

    /// Whether the bounds (and values) are integers.
    fn bounds_are_integer(&self) -> bool;

    /// Lower bound in the output type.
    fn lower_bound(&self) -> NumericValue {
        if self.bounds_are_integer() {
            self.output_type().cast(NumericValue::Long(self.lower_bound_long()))
        } else {
            self.output_type().cast(NumericValue::Double(self.lower_bound_double()))
        }
    }

    /// Upper bound in the output type.
    fn upper_bound(&self) -> NumericValue {
        if self.bounds_are_integer() {
            self.output_type().cast(NumericValue::Long(self.upper_bound_long()))
        } else {
            self.output_type().cast(NumericValue::Double(self.upper_bound_double()))
        }
    }
}

/// The unbounded parser matching a primitive type.
#[must_use]
pub fn default_parser(primitive_type: PrimitiveType) -> Arc<dyn NumberParser> {
    if primitive_type.is_integer() {
        Arc::new(IntegerParser::spanning(primitive_type))
    } else {
        Arc::new(RealParser::spanning(primitive_type))
    }
}
