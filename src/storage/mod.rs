//! Data point storage
//!
//! A data point is one row of measurements, one column per dimension. The
//! [`DataPoint`] and [`DataFactory`] traits are the contract every storage
//! strategy implements; [`LongEncodedDataFactory`] is the generic strategy
//! and the reference semantics for all others.
//!
//! Points are immutable: the trait has no mutating methods, and compiled
//! points are shared as [`DataPointRef`].

mod long_encoded;
mod value;

pub use long_encoded::{decode, encode, LongEncodedDataFactory, LongEncodedDataPoint};
pub use value::{NumericValue, PrimitiveType};

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::dimension::{DimensionDirection, DimensionType};
use crate::parser::NumberParser;
use crate::run::Run;
use crate::{Error, Result};

/// Shared handle to an immutable data point.
pub type DataPointRef = Arc<dyn DataPoint>;

/// What a column of a data point needs to know about its dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Dimension name
    pub name: String,
    /// Storage type of the column
    pub primitive_type: PrimitiveType,
    /// Direction the values progress in along a run
    pub direction: DimensionDirection,
    /// Kind of measure; decides the lookup policy
    pub dimension_type: DimensionType,
}

impl ColumnSpec {
    /// Whether values progress upwards.
    #[must_use]
    pub const fn is_increasing(&self) -> bool {
        self.direction.is_increasing()
    }

    /// Whether the column is a solution-quality measure.
    #[must_use]
    pub const fn is_quality_measure(&self) -> bool {
        self.dimension_type.is_solution_quality_measure()
    }

    /// Orient a raw comparison so that `Greater` means "further along the run".
    #[must_use]
    pub const fn orient(&self, raw: Ordering) -> Ordering {
        if self.is_increasing() {
            raw
        } else {
            raw.reverse()
        }
    }
}

/// Column layout shared by all points of one dimension set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointLayout {
    columns: Box<[ColumnSpec]>,
}

impl PointLayout {
    /// Layout over the given columns.
    #[must_use]
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns: columns.into_boxed_slice(),
        }
    }

    /// The columns, in dimension order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Column `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; column indices are programming
    /// constants, never data.
    #[must_use]
    pub fn column(&self, index: usize) -> &ColumnSpec {
        &self.columns[index]
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One immutable row of measurements.
pub trait DataPoint: Send + Sync + fmt::Debug {
    /// Column layout of this point.
    fn layout(&self) -> &PointLayout;

    /// Value of `column`, typed by the column's primitive type.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    fn get(&self, column: usize) -> NumericValue;

    /// Number of columns.
    fn len(&self) -> usize {
        self.layout().len()
    }

    /// Whether the point has no columns.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of `column` as `i64`.
    fn get_long(&self, column: usize) -> i64 {
        self.get(column).as_long()
    }

    /// Value of `column` as `f64`.
    fn get_double(&self, column: usize) -> f64 {
        self.get(column).as_double()
    }

    /// All values in column order.
    fn values(&self) -> Vec<NumericValue> {
        (0..self.len()).map(|column| self.get(column)).collect()
    }

    /// Order of points along a run: the first differing column decides, with
    /// the sign flipped for decreasing dimensions.
    fn compare_to(&self, other: &dyn DataPoint) -> Ordering {
        let layout = self.layout();
        for column in 0..self.len().min(other.len()) {
            let raw = self.get(column).total_cmp(&other.get(column));
            if raw != Ordering::Equal {
                return layout.column(column).orient(raw);
            }
        }
        self.len().cmp(&other.len())
    }

    /// Column-wise equality, consistent with [`DataPoint::compare_to`].
    fn equals(&self, other: &dyn DataPoint) -> bool {
        self.compare_to(other) == Ordering::Equal
    }

    /// Check that this point may directly follow `before` in a run: no column
    /// regresses against its dimension's direction and at least one differs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RunOrder`] naming the offending column.
    fn validate_after(&self, before: &dyn DataPoint) -> Result<()> {
        if self.len() != before.len() {
            return Err(Error::RunOrder {
                before: render(before),
                after: format_values(&self.values()),
                detail: format!("arity {} differs from {}", self.len(), before.len()),
            });
        }
        let layout = self.layout();
        let mut progressed = false;
        for column in 0..self.len() {
            let spec = layout.column(column);
            let (old, new) = (before.get(column), self.get(column));
            match spec.orient(new.total_cmp(&old)) {
                Ordering::Less => {
                    return Err(Error::RunOrder {
                        before: render(before),
                        after: format_values(&self.values()),
                        detail: format!(
                            "dimension '{}' regresses from {old} to {new} against its {} direction",
                            spec.name, spec.direction
                        ),
                    });
                }
                Ordering::Greater => progressed = true,
                Ordering::Equal => {}
            }
        }
        if progressed {
            Ok(())
        } else {
            Err(Error::RunOrder {
                before: render(before),
                after: format_values(&self.values()),
                detail: "identical to its predecessor in every dimension".to_string(),
            })
        }
    }
}

fn render(point: &dyn DataPoint) -> String {
    point.to_string()
}

fn format_values(values: &[NumericValue]) -> String {
    let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("({})", joined.join(", "))
}

impl fmt::Display for dyn DataPoint + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_values(&self.values()))
    }
}

/// Storage strategy for the points of one dimension set.
pub trait DataFactory: Send + Sync + fmt::Debug {
    /// Short name of the strategy, for diagnostics.
    fn name(&self) -> &'static str;

    /// Column layout the factory is bound to.
    fn layout(&self) -> &Arc<PointLayout>;

    /// Parsers of the columns, in dimension order.
    fn parsers(&self) -> &[Arc<dyn NumberParser>];

    /// Store values that already have the exact column types.
    fn store(&self, values: Vec<NumericValue>) -> DataPointRef;

    /// Build a point from typed numbers, running each through its column's
    /// parser.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on arity mismatch, and the parser's error
    /// (fidelity, range) for an inadmissible value.
    fn parse_numbers(&self, values: &[NumericValue]) -> Result<DataPointRef> {
        let parsers = self.parsers();
        if values.len() != parsers.len() {
            return Err(Error::Parse {
                input: format!("{values:?}"),
                message: format!("expected {} values, found {}", parsers.len(), values.len()),
                suppressed: Vec::new(),
            });
        }
        let typed = values
            .iter()
            .zip(parsers)
            .enumerate()
            .map(|(column, (value, parser))| {
                parser
                    .parse_number(*value)
                    .map_err(|e| e.in_column(&self.layout().column(column).name))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.store(typed))
    }

    /// Build a point from text with one token per column, separated by
    /// whitespace, commas or semicolons.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the offending token, or the whole text
    /// on arity mismatch.
    fn parse_string(&self, text: &str) -> Result<DataPointRef> {
        let parsers = self.parsers();
        let tokens: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.len() != parsers.len() {
            return Err(Error::Parse {
                input: text.to_string(),
                message: format!("expected {} values, found {}", parsers.len(), tokens.len()),
                suppressed: Vec::new(),
            });
        }
        let typed = tokens
            .iter()
            .zip(parsers)
            .enumerate()
            .map(|(column, (token, parser))| {
                let name = &self.layout().column(column).name;
                parser.parse_string(token).map_err(|e| match e {
                    Error::Parse { .. } => e.in_column(name),
                    other => Error::Parse {
                        input: (*token).to_string(),
                        message: format!("dimension '{name}': {other}"),
                        suppressed: Vec::new(),
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.store(typed))
    }

    /// Package points into a validated run.
    ///
    /// # Errors
    ///
    /// See [`Run::new`].
    fn create_run(&self, points: Vec<DataPointRef>) -> Result<Run> {
        Run::new(Arc::clone(self.layout()), points)
    }
}
