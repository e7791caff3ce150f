//! Run builder

use std::sync::Arc;

use bitflags::bitflags;

use super::{Builder, Context};
use crate::run::Run;
use crate::storage::{DataFactory, DataPointRef, NumericValue};
use crate::Result;

bitflags! {
    /// Fields of a [`RunBuilder`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RunField: u8 {
        /// Data points
        const POINTS = 1;
    }
}

/// Collects the data points of one run.
#[derive(Debug)]
pub struct RunBuilder {
    factory: Arc<dyn DataFactory>,
    points: Vec<DataPointRef>,
}

/// Context building one [`Run`].
pub type RunContext = Context<RunBuilder>;

impl RunBuilder {
    /// Builder storing its points through `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn DataFactory>) -> Self {
        Self {
            factory,
            points: Vec::new(),
        }
    }

    /// A fresh, unopened run context.
    #[must_use]
    pub fn context(factory: Arc<dyn DataFactory>) -> RunContext {
        Context::new(Self::new(factory))
    }
}

impl Builder for RunBuilder {
    type Field = RunField;
    type Output = Run;

    const KIND: &'static str = "run";
    const REQUIRED: RunField = RunField::POINTS;

    fn build(&mut self) -> Result<Run> {
        self.factory.create_run(std::mem::take(&mut self.points))
    }
}

impl Context<RunBuilder> {
    /// Add a point given as one number per dimension.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or the parse error of an inadmissible value.
    pub fn add_point(&self, values: &[NumericValue]) -> Result<()> {
        self.update(RunField::POINTS, |b| {
            let point = b.factory.parse_numbers(values)?;
            b.points.push(point);
            Ok(())
        })
    }

    /// Add a point given as text, one token per dimension.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or [`Error::Parse`](crate::Error::Parse) naming the
    /// offending token.
    pub fn add_point_text(&self, text: &str) -> Result<()> {
        self.update(RunField::POINTS, |b| {
            let point = b.factory.parse_string(text)?;
            b.points.push(point);
            Ok(())
        })
    }

    /// Add an already built point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`](crate::Error::Lifecycle) unless open.
    pub fn add_data_point(&self, point: DataPointRef) -> Result<()> {
        self.update(RunField::POINTS, |b| {
            b.points.push(point);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::State;
    use crate::dimension::{DimensionDirection, DimensionType};
    use crate::parser::default_parser;
    use crate::storage::{ColumnSpec, LongEncodedDataFactory, PointLayout, PrimitiveType};
    use crate::Error;

    fn factory() -> Arc<dyn DataFactory> {
        let layout = PointLayout::new(vec![ColumnSpec {
            name: "fes".to_string(),
            primitive_type: PrimitiveType::Int,
            direction: DimensionDirection::IncreasingStrictly,
            dimension_type: DimensionType::IterationFe,
        }]);
        Arc::new(LongEncodedDataFactory::new(
            Arc::new(layout),
            vec![default_parser(PrimitiveType::Int)],
        ))
    }

    #[test]
    fn test_collects_points() {
        let ctx = RunBuilder::context(factory());
        ctx.open().unwrap();
        ctx.add_point_text("30").unwrap();
        ctx.add_point(&[NumericValue::Long(10)]).unwrap();
        let f = factory();
        ctx.add_data_point(f.parse_string("20").unwrap()).unwrap();
        let run = ctx.finish().unwrap();
        let fes: Vec<i64> = run.iter().map(|p| p.get_long(0)).collect();
        assert_eq!(fes, vec![10, 20, 30]);
        assert_eq!(ctx.state(), State::Compiled);
    }

    #[test]
    fn test_bad_token_keeps_context_open() {
        let ctx = RunBuilder::context(factory());
        ctx.open().unwrap();
        assert!(matches!(ctx.add_point_text("ten"), Err(Error::Parse { .. })));
        ctx.add_point_text("10").unwrap();
        assert_eq!(ctx.state(), State::Open);
    }

    #[test]
    fn test_requires_points() {
        let ctx = RunBuilder::context(factory());
        ctx.open().unwrap();
        ctx.close().unwrap();
        assert!(matches!(ctx.compile(), Err(Error::MissingFields { .. })));
    }

    #[test]
    fn test_result_before_compile() {
        let ctx = RunBuilder::context(factory());
        ctx.open().unwrap();
        ctx.add_point_text("1").unwrap();
        assert!(matches!(
            ctx.result(),
            Err(Error::Lifecycle {
                expected: State::Compiled,
                actual: State::Open,
                ..
            })
        ));
    }
}
