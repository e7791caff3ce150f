//! Runs and the run lookup engine
//!
//! A [`Run`] is the sorted sequence of data points one algorithm produced on
//! one instance. Lookups are binary searches on a single column that answer
//! both "best quality reached by time T" and "time at which quality Q was
//! first reached":
//!
//! - time-like columns are conservative and return the last point at or
//!   before the query value;
//! - quality columns are optimistic and return the first point at or after
//!   it.

mod search;

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use tracing::debug;

use crate::dataset::{SetElement, SetMember};
use crate::id::{IdObject, Membership, SetHandle};
use crate::storage::{DataPointRef, NumericValue, PointLayout, PrimitiveType};
use crate::{Error, Result};

use search::{find_index, ColumnType, Policy};

/// Immutable, validated sequence of data points.
#[derive(Debug, Clone)]
pub struct Run {
    membership: Membership,
    layout: Arc<PointLayout>,
    points: Box<[DataPointRef]>,
}

impl Run {
    /// Sort `points` into run order and validate every consecutive pair.
    ///
    /// # Errors
    ///
    /// * [`Error::EmptySet`] if there are no points
    /// * [`Error::InvalidArgument`] if a point has a different layout
    /// * [`Error::RunOrder`] if a point regresses in some dimension or repeats
    ///   its predecessor
    pub fn new(layout: Arc<PointLayout>, mut points: Vec<DataPointRef>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptySet("run".to_string()));
        }
        if let Some(point) = points.iter().find(|p| p.layout() != layout.as_ref()) {
            return Err(Error::InvalidArgument(format!(
                "data point {} does not belong to the run's dimensions",
                point.as_ref()
            )));
        }
        points.sort_by(|a, b| a.compare_to(b.as_ref()));
        for pair in points.windows(2) {
            pair[1].validate_after(pair[0].as_ref())?;
        }
        debug!(points = points.len(), "validated run");
        Ok(Self {
            membership: Membership::detached("run"),
            layout,
            points: points.into_boxed_slice(),
        })
    }

    /// Column layout of the points.
    #[must_use]
    pub fn layout(&self) -> &Arc<PointLayout> {
        &self.layout
    }

    /// The points, in run order.
    #[must_use]
    pub fn points(&self) -> &[DataPointRef] {
        &self.points
    }

    /// First point.
    #[must_use]
    pub fn first(&self) -> &DataPointRef {
        &self.points[0]
    }

    /// Last point.
    #[must_use]
    pub fn last(&self) -> &DataPointRef {
        &self.points[self.points.len() - 1]
    }

    /// Point for `value` in `column`.
    ///
    /// `value` is cast to the column's primitive type before searching.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    #[must_use]
    pub fn find(&self, column: usize, value: NumericValue) -> Option<&DataPointRef> {
        let spec = self.layout.column(column);
        let policy = Policy {
            increasing: spec.is_increasing(),
            strict: spec.direction.is_strict(),
            optimistic: spec.is_quality_measure(),
        };
        let key = spec.primitive_type.cast(value);
        let index = match spec.primitive_type {
            PrimitiveType::Byte => self.search::<i8>(column, key, policy),
            PrimitiveType::Short => self.search::<i16>(column, key, policy),
            PrimitiveType::Int => self.search::<i32>(column, key, policy),
            PrimitiveType::Long => self.search::<i64>(column, key, policy),
            PrimitiveType::Float => self.search::<f32>(column, key, policy),
            PrimitiveType::Double => self.search::<f64>(column, key, policy),
        };
        index.map(|i| &self.points[i])
    }

    /// [`Run::find`] with an integer query.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    #[must_use]
    pub fn find_long(&self, column: usize, value: i64) -> Option<&DataPointRef> {
        self.find(column, NumericValue::Long(value))
    }

    /// [`Run::find`] with a floating point query.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    #[must_use]
    pub fn find_double(&self, column: usize, value: f64) -> Option<&DataPointRef> {
        self.find(column, NumericValue::Double(value))
    }

    fn search<T: ColumnType>(&self, column: usize, key: NumericValue, policy: Policy) -> Option<usize> {
        find_index(&self.points, column, T::from_value(key), policy)
    }
}

impl Deref for Run {
    type Target = [DataPointRef];

    fn deref(&self) -> &[DataPointRef] {
        &self.points
    }
}

impl IdObject for Run {
    fn id(&self) -> u64 {
        self.membership.index() as u64
    }

    fn path(&self) -> &str {
        self.membership.path()
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} points, {} .. {}]",
            self.membership.path(),
            self.points.len(),
            self.first().as_ref(),
            self.last().as_ref()
        )
    }
}

impl SetElement for Run {
    /// Lexicographic over the points, shorter runs first on a common prefix.
    fn compare(&self, other: &Self) -> Ordering {
        self.points
            .iter()
            .zip(other.points.iter())
            .map(|(a, b)| a.compare_to(b.as_ref()))
            .find(|c| *c != Ordering::Equal)
            .unwrap_or_else(|| self.points.len().cmp(&other.points.len()))
    }

    fn equivalent(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl SetMember for Run {
    fn bind(&mut self, owner: &SetHandle, index: usize) {
        self.membership = Membership::within(owner, index, &format!("run{index}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionDirection, DimensionType};
    use crate::parser::default_parser;
    use crate::storage::{ColumnSpec, DataFactory, LongEncodedDataFactory};

    fn factory(q_direction: DimensionDirection) -> LongEncodedDataFactory {
        let layout = PointLayout::new(vec![
            ColumnSpec {
                name: "t".to_string(),
                primitive_type: PrimitiveType::Long,
                direction: DimensionDirection::Increasing,
                dimension_type: DimensionType::RuntimeCpu,
            },
            ColumnSpec {
                name: "q".to_string(),
                primitive_type: PrimitiveType::Double,
                direction: q_direction,
                dimension_type: DimensionType::QualityProblemDependent,
            },
        ]);
        LongEncodedDataFactory::new(
            Arc::new(layout),
            vec![
                default_parser(PrimitiveType::Long),
                default_parser(PrimitiveType::Double),
            ],
        )
    }

    fn run(factory: &LongEncodedDataFactory, rows: &[&str]) -> Result<Run> {
        let points = rows
            .iter()
            .map(|row| factory.parse_string(row))
            .collect::<Result<Vec<_>>>()?;
        factory.create_run(points)
    }

    fn values(point: Option<&DataPointRef>) -> Option<(i64, f64)> {
        point.map(|p| (p.get_long(0), p.get_double(1)))
    }

    #[test]
    fn test_sorts_points() {
        let f = factory(DimensionDirection::DecreasingStrictly);
        let run = run(&f, &["9 7", "0 10", "20 3", "5 7"]).unwrap();
        let t: Vec<i64> = run.iter().map(|p| p.get_long(0)).collect();
        assert_eq!(t, vec![0, 5, 9, 20]);
    }

    #[test]
    fn test_exact_hit_takes_earliest() {
        let f = factory(DimensionDirection::DecreasingStrictly);
        let run = run(&f, &["0 10", "5 7", "9 7", "20 3"]).unwrap();
        assert_eq!(values(run.find_double(1, 7.0)), Some((5, 7.0)));
    }

    #[test]
    fn test_non_strict_scans_back() {
        let f = factory(DimensionDirection::Decreasing);
        let run = run(&f, &["0 10", "1 7", "2 7", "3 7", "4 7", "5 1"]).unwrap();
        assert_eq!(values(run.find_double(1, 7.0)), Some((1, 7.0)));
    }

    #[test]
    fn test_time_is_conservative() {
        let f = factory(DimensionDirection::DecreasingStrictly);
        let run = run(&f, &["0 10", "5 7", "9 7", "20 3"]).unwrap();
        assert_eq!(values(run.find_long(0, 6)), Some((5, 7.0)));
        assert_eq!(values(run.find_long(0, 100)), Some((20, 3.0)));
        assert_eq!(values(run.find_long(0, -1)), None);
    }

    #[test]
    fn test_quality_is_optimistic() {
        let f = factory(DimensionDirection::DecreasingStrictly);
        let run = run(&f, &["0 10", "5 7", "9 7", "20 3"]).unwrap();
        assert_eq!(values(run.find_double(1, 5.0)), Some((20, 3.0)));
        assert_eq!(values(run.find_double(1, 11.0)), Some((0, 10.0)));
        assert_eq!(values(run.find_double(1, 1.0)), None);
    }

    #[test]
    fn test_query_cast_to_column_type() {
        let f = factory(DimensionDirection::Decreasing);
        let run = run(&f, &["0 10", "5 7"]).unwrap();
        assert_eq!(values(run.find(0, NumericValue::Double(5.9))), Some((5, 7.0)));
    }

    #[test]
    fn test_rejects_regression() {
        let f = factory(DimensionDirection::Decreasing);
        let result = run(&f, &["0 5", "1 6"]);
        assert!(matches!(result, Err(Error::RunOrder { .. })));
    }

    #[test]
    fn test_rejects_repeated_point() {
        let f = factory(DimensionDirection::Decreasing);
        let result = run(&f, &["0 5", "0 5"]);
        assert!(matches!(result, Err(Error::RunOrder { .. })));
    }

    #[test]
    fn test_rejects_empty() {
        let f = factory(DimensionDirection::Decreasing);
        assert!(matches!(f.create_run(Vec::new()), Err(Error::EmptySet(_))));
    }

    #[test]
    fn test_rejects_foreign_layout() {
        let f = factory(DimensionDirection::Decreasing);
        let other = factory(DimensionDirection::Increasing);
        let point = other.parse_string("1 1").unwrap();
        assert!(matches!(
            f.create_run(vec![point]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_run_order() {
        let f = factory(DimensionDirection::Decreasing);
        let a = run(&f, &["0 10", "5 7"]).unwrap();
        let b = run(&f, &["0 10", "5 6"]).unwrap();
        let c = run(&f, &["0 10"]).unwrap();
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(c.compare(&a), Ordering::Less);
        assert!(a.equivalent(&a.clone()));
    }
}
