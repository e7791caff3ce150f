//! Bounded integer and real parsers
//!
//! Both parsers try several strategies before giving up. The error reported
//! is the one from the first (most specific) strategy; the others are
//! attached as suppressed context.

use super::{NumberParser, Parser};
use crate::storage::{NumericValue, PrimitiveType};
use crate::{Error, Result};

/// Failures collected while trying parsing strategies in order.
struct Attempts<'a> {
    text: &'a str,
    failures: Vec<String>,
}

impl<'a> Attempts<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            failures: Vec::new(),
        }
    }

    fn attempt<T>(&mut self, strategy: &str, outcome: std::result::Result<T, String>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(reason) => {
                self.failures.push(format!("{strategy}: {reason}"));
                None
            }
        }
    }

    fn into_error(self) -> Error {
        let mut failures = self.failures.into_iter();
        Error::Parse {
            input: self.text.to_string(),
            message: failures
                .next()
                .unwrap_or_else(|| "no parsing strategy available".to_string()),
            suppressed: failures.collect(),
        }
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn parse_hex(text: &str) -> std::result::Result<i64, String> {
    let (negative, digits) = split_sign(text);
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .ok_or_else(|| "missing 0x prefix".to_string())?;
    let magnitude = i128::from_str_radix(digits, 16).map_err(|e| e.to_string())?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|e| e.to_string())
}

fn parse_integral_float(text: &str) -> std::result::Result<i64, String> {
    let v = text.parse::<f64>().map_err(|e| e.to_string())?;
    PrimitiveType::Long
        .convert_exact(NumericValue::Double(v))
        .map(NumericValue::as_long)
        .ok_or_else(|| format!("{v} is not an integer"))
}

fn parse_fraction(text: &str) -> std::result::Result<f64, String> {
    let (numerator, denominator) = text
        .split_once('/')
        .ok_or_else(|| "no '/' found".to_string())?;
    let numerator = numerator.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let denominator = denominator.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if denominator == 0.0 {
        return Err("zero denominator".to_string());
    }
    Ok(numerator / denominator)
}

/// Parser for integer dimensions with inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerParser {
    output: PrimitiveType,
    lower: i64,
    upper: i64,
}

impl IntegerParser {
    /// Create a parser for `output` accepting `lower..=upper`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `output` is not an integer type, and
    /// [`Error::OutOfRange`] if the bounds are inverted or do not fit `output`.
    pub fn new(output: PrimitiveType, lower: i64, upper: i64) -> Result<Self> {
        if !output.is_integer() {
            return Err(Error::TypeMismatch {
                target: "integer parser".to_string(),
                expected: "an integer type".to_string(),
                actual: output.to_string(),
            });
        }
        let full = Self::spanning(output);
        if lower > upper || lower < full.lower || upper > full.upper {
            return Err(Error::OutOfRange {
                target: format!("{output} parser bounds"),
                value: format!("[{lower}, {upper}]"),
                lower: full.lower.to_string(),
                upper: full.upper.to_string(),
            });
        }
        Ok(Self {
            output,
            lower,
            upper,
        })
    }

    /// Parser accepting every value of `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `output` is not an integer type.
    pub fn full(output: PrimitiveType) -> Result<Self> {
        let full = Self::spanning(output);
        Self::new(output, full.lower, full.upper)
    }

    pub(crate) fn spanning(output: PrimitiveType) -> Self {
        Self {
            output,
            lower: output.min_value().as_long(),
            upper: output.max_value().as_long(),
        }
    }

    fn check(&self, value: i64) -> Result<NumericValue> {
        if value < self.lower || value > self.upper {
            return Err(Error::OutOfRange {
                target: format!("{} parser", self.output),
                value: value.to_string(),
                lower: self.lower.to_string(),
                upper: self.upper.to_string(),
            });
        }
        Ok(self.output.cast(NumericValue::Long(value)))
    }
}

impl Parser<NumericValue> for IntegerParser {
    fn parse_string(&self, text: &str) -> Result<NumericValue> {
        let text = text.trim();
        let mut attempts = Attempts::new(text);
        let value = attempts
            .attempt("decimal", text.parse::<i64>().map_err(|e| e.to_string()))
            .or_else(|| attempts.attempt("hexadecimal", parse_hex(text)))
            .or_else(|| attempts.attempt("scientific", parse_integral_float(text)));
        let Some(value) = value else {
            return Err(attempts.into_error());
        };
        self.check(value)
    }

    fn validate(&self, value: &NumericValue) -> Result<()> {
        let exact = PrimitiveType::Long.convert_exact(*value).ok_or_else(|| {
            Error::FidelityLoss(format!("{value} is not an integer"))
        })?;
        self.check(exact.as_long()).map(|_| ())
    }
}

impl NumberParser for IntegerParser {
    fn output_type(&self) -> PrimitiveType {
        self.output
    }

    fn parse_number(&self, value: NumericValue) -> Result<NumericValue> {
        let exact = PrimitiveType::Long.convert_exact(value).ok_or_else(|| {
            Error::FidelityLoss(format!("{value} cannot be represented as {}", self.output))
        })?;
        self.check(exact.as_long())
    }

    fn lower_bound_long(&self) -> i64 {
        self.lower
    }

    fn upper_bound_long(&self) -> i64 {
        self.upper
    }

    #[allow(clippy::cast_precision_loss)]
    fn lower_bound_double(&self) -> f64 {
        self.lower as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn upper_bound_double(&self) -> f64 {
        self.upper as f64
    }

    fn bounds_are_integer(&self) -> bool {
        true
    }
}

/// Parser for `float`/`double` dimensions with inclusive bounds. NaN is never
/// admissible.
#[derive(Debug, Clone, PartialEq)]
pub struct RealParser {
    output: PrimitiveType,
    lower: f64,
    upper: f64,
}

impl RealParser {
    /// Create a parser for `output` accepting `lower..=upper`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `output` is an integer type,
    /// [`Error::OutOfRange`] if the bounds are NaN or inverted, and
    /// [`Error::FidelityLoss`] if a bound is not representable in `output`.
    pub fn new(output: PrimitiveType, lower: f64, upper: f64) -> Result<Self> {
        if output.is_integer() {
            return Err(Error::TypeMismatch {
                target: "real parser".to_string(),
                expected: "float or double".to_string(),
                actual: output.to_string(),
            });
        }
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(Error::OutOfRange {
                target: format!("{output} parser bounds"),
                value: format!("[{lower}, {upper}]"),
                lower: "-inf".to_string(),
                upper: "inf".to_string(),
            });
        }
        for bound in [lower, upper] {
            if output.convert_exact(NumericValue::Double(bound)).is_none() {
                return Err(Error::FidelityLoss(format!(
                    "parser bound {bound} is not representable as {output}"
                )));
            }
        }
        Ok(Self {
            output,
            lower,
            upper,
        })
    }

    /// Parser accepting every non-NaN value of `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `output` is an integer type.
    pub fn full(output: PrimitiveType) -> Result<Self> {
        Self::new(output, f64::NEG_INFINITY, f64::INFINITY)
    }

    pub(crate) fn spanning(output: PrimitiveType) -> Self {
        Self {
            output,
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    fn check(&self, value: f64) -> Result<NumericValue> {
        if !(value >= self.lower && value <= self.upper) {
            return Err(Error::OutOfRange {
                target: format!("{} parser", self.output),
                value: value.to_string(),
                lower: self.lower.to_string(),
                upper: self.upper.to_string(),
            });
        }
        Ok(self.output.cast(NumericValue::Double(value)))
    }
}

impl Parser<NumericValue> for RealParser {
    fn parse_string(&self, text: &str) -> Result<NumericValue> {
        let text = text.trim();
        let decimal = if self.output == PrimitiveType::Float {
            text.parse::<f32>().map(f64::from).map_err(|e| e.to_string())
        } else {
            text.parse::<f64>().map_err(|e| e.to_string())
        };
        let mut attempts = Attempts::new(text);
        let value = attempts
            .attempt("decimal", decimal)
            .or_else(|| attempts.attempt("fraction", parse_fraction(text)))
            .or_else(|| {
                #[allow(clippy::cast_precision_loss)]
                let hex = parse_hex(text).map(|v| v as f64);
                attempts.attempt("hexadecimal", hex)
            });
        let Some(value) = value else {
            return Err(attempts.into_error());
        };
        self.check(value)
    }

    fn validate(&self, value: &NumericValue) -> Result<()> {
        self.check(value.as_double()).map(|_| ())
    }
}

impl NumberParser for RealParser {
    fn output_type(&self) -> PrimitiveType {
        self.output
    }

    fn parse_number(&self, value: NumericValue) -> Result<NumericValue> {
        let exact = self.output.convert_exact(value).ok_or_else(|| {
            Error::FidelityLoss(format!("{value} cannot be represented as {}", self.output))
        })?;
        self.check(exact.as_double())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn lower_bound_long(&self) -> i64 {
        self.lower as i64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn upper_bound_long(&self) -> i64 {
        self.upper as i64
    }

    fn lower_bound_double(&self) -> f64 {
        self.lower
    }

    fn upper_bound_double(&self) -> f64 {
        self.upper
    }

    fn bounds_are_integer(&self) -> bool {
        false
    }
}
