//! Dimension model
//!
//! A dimension is one measured axis of a data point: its storage type, the
//! direction its values progress in along a run, its default bounds and the
//! parser that reads its values.

mod set;

pub use set::DimensionSet;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::{SetElement, SetMember};
use crate::id::{names_equivalent, normalize_name, IdObject, Membership, NamedIdObject, SetHandle};
use crate::parser::NumberParser;
use crate::storage::{ColumnSpec, NumericValue, PrimitiveType};
use crate::{Error, Result};

/// Direction in which a dimension's values progress along a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionDirection {
    /// Values never decrease
    Increasing,
    /// Values never decrease and rarely repeat
    IncreasingStrictly,
    /// Values never increase
    Decreasing,
    /// Values never increase and rarely repeat
    DecreasingStrictly,
}

impl DimensionDirection {
    /// Whether values grow along a run.
    #[must_use]
    pub const fn is_increasing(self) -> bool {
        matches!(self, Self::Increasing | Self::IncreasingStrictly)
    }

    /// Whether the dimension is declared strict. Lookups then take the first
    /// exact hit instead of scanning back to the earliest equal value.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::IncreasingStrictly | Self::DecreasingStrictly)
    }
}

impl fmt::Display for DimensionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increasing => "increasing",
            Self::IncreasingStrictly => "strictly increasing",
            Self::Decreasing => "decreasing",
            Self::DecreasingStrictly => "strictly decreasing",
        })
    }
}

/// What a dimension measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionType {
    /// Objective function evaluations
    IterationFe,
    /// Algorithm steps or generations
    IterationAlgorithmStep,
    /// Partial objective function evaluations
    IterationSubFe,
    /// Consumed CPU time
    RuntimeCpu,
    /// Runtime normalized by a machine-dependent factor
    RuntimeNormalized,
    /// Solution quality on the instance's own scale
    QualityProblemDependent,
    /// Solution quality normalized across instances
    QualityProblemIndependent,
}

impl DimensionType {
    /// Whether the dimension measures elapsed time or effort.
    #[must_use]
    pub const fn is_time_measure(self) -> bool {
        !self.is_solution_quality_measure()
    }

    /// Whether the dimension measures solution quality.
    #[must_use]
    pub const fn is_solution_quality_measure(self) -> bool {
        matches!(
            self,
            Self::QualityProblemDependent | Self::QualityProblemIndependent
        )
    }
}

/// One measurement axis.
#[derive(Debug, Clone)]
pub struct Dimension {
    membership: Membership,
    name: String,
    description: Option<String>,
    primitive_type: PrimitiveType,
    dimension_type: DimensionType,
    direction: DimensionDirection,
    lower: NumericValue,
    upper: NumericValue,
    parser: Arc<dyn NumberParser>,
}

impl Dimension {
    /// Create a detached dimension.
    ///
    /// Bounds default to the parser's bounds; given bounds must be exactly
    /// representable in `primitive_type`, admissible for the parser and
    /// ordered.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if the name normalizes to nothing
    /// * [`Error::TypeMismatch`] if the parser's output type or the integer-ness
    ///   of its bounds disagrees with `primitive_type`
    /// * [`Error::FidelityLoss`] if a bound is not exactly representable
    /// * [`Error::OutOfRange`] if a bound is rejected by the parser or
    ///   `lower > upper`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        description: Option<String>,
        primitive_type: PrimitiveType,
        dimension_type: DimensionType,
        direction: DimensionDirection,
        parser: Arc<dyn NumberParser>,
        lower: Option<NumericValue>,
        upper: Option<NumericValue>,
    ) -> Result<Self> {
        let name = normalize_name(name)?;
        if parser.output_type() != primitive_type
            || parser.bounds_are_integer() != primitive_type.is_integer()
        {
            return Err(Error::TypeMismatch {
                target: format!("parser of dimension '{name}'"),
                expected: primitive_type.to_string(),
                actual: format!(
                    "{} (integer bounds: {})",
                    parser.output_type(),
                    parser.bounds_are_integer()
                ),
            });
        }

        let bound = |given: Option<NumericValue>, fallback: NumericValue, which: &str| {
            let value = given.unwrap_or(fallback);
            let exact = primitive_type.convert_exact(value).ok_or_else(|| {
                Error::FidelityLoss(format!(
                    "{which} bound {value} of dimension '{name}' is not representable as {primitive_type}"
                ))
            })?;
            parser.validate(&exact)?;
            Ok::<_, Error>(exact)
        };
        let lower = bound(lower, parser.lower_bound(), "lower")?;
        let upper = bound(upper, parser.upper_bound(), "upper")?;
        if lower.total_cmp(&upper) == Ordering::Greater {
            return Err(Error::OutOfRange {
                target: format!("bounds of dimension '{name}'"),
                value: format!("[{lower}, {upper}]"),
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }

        Ok(Self {
            membership: Membership::detached(&name),
            name,
            description,
            primitive_type,
            dimension_type,
            direction,
            lower,
            upper,
            parser,
        })
    }

    /// Storage type.
    #[must_use]
    pub const fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    /// Kind of measure.
    #[must_use]
    pub const fn dimension_type(&self) -> DimensionType {
        self.dimension_type
    }

    /// Progression direction.
    #[must_use]
    pub const fn direction(&self) -> DimensionDirection {
        self.direction
    }

    /// Default lower bound of instances.
    #[must_use]
    pub const fn default_lower(&self) -> NumericValue {
        self.lower
    }

    /// Default upper bound of instances.
    #[must_use]
    pub const fn default_upper(&self) -> NumericValue {
        self.upper
    }

    /// Value parser.
    #[must_use]
    pub fn parser(&self) -> &Arc<dyn NumberParser> {
        &self.parser
    }

    /// Position in the owning set.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.membership.index()
    }

    /// Column description used by data points.
    #[must_use]
    pub fn column_spec(&self) -> ColumnSpec {
        ColumnSpec {
            name: self.name.clone(),
            primitive_type: self.primitive_type,
            direction: self.direction,
            dimension_type: self.dimension_type,
        }
    }
}

impl IdObject for Dimension {
    fn id(&self) -> u64 {
        self.membership.index() as u64
    }

    fn path(&self) -> &str {
        self.membership.path()
    }
}

impl NamedIdObject for Dimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.membership.path())
    }
}

impl SetElement for Dimension {
    fn compare(&self, other: &Self) -> Ordering {
        self.index()
            .cmp(&other.index())
            .then_with(|| crate::id::compare_names(&self.name, &other.name))
    }

    fn equivalent(&self, other: &Self) -> bool {
        names_equivalent(&self.name, &other.name)
    }
}

impl SetMember for Dimension {
    fn bind(&mut self, owner: &SetHandle, index: usize) {
        self.membership = Membership::within(owner, index, &self.name);
    }
}
