//! Dimension builder

use std::sync::Arc;

use bitflags::bitflags;

use super::named::NamedFields;
use super::{Builder, Context};
use crate::dimension::{Dimension, DimensionDirection, DimensionType};
use crate::parser::{default_parser, NumberParser};
use crate::storage::{NumericValue, PrimitiveType};
use crate::{Error, Result};

bitflags! {
    /// Fields of a [`DimensionBuilder`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DimensionField: u16 {
        /// Name
        const NAME = 1;
        /// Description fragments
        const DESCRIPTION = 1 << 1;
        /// Primitive type
        const PRIMITIVE_TYPE = 1 << 2;
        /// Dimension type
        const DIMENSION_TYPE = 1 << 3;
        /// Direction
        const DIRECTION = 1 << 4;
        /// Value parser
        const PARSER = 1 << 5;
        /// Default lower bound
        const LOWER = 1 << 6;
        /// Default upper bound
        const UPPER = 1 << 7;
    }
}

/// Accumulates the fields of a [`Dimension`].
#[derive(Debug, Default)]
pub struct DimensionBuilder {
    named: NamedFields,
    primitive_type: Option<PrimitiveType>,
    dimension_type: Option<DimensionType>,
    direction: Option<DimensionDirection>,
    parser: Option<Arc<dyn NumberParser>>,
    lower: Option<NumericValue>,
    upper: Option<NumericValue>,
}

/// Context building one [`Dimension`].
pub type DimensionContext = Context<DimensionBuilder>;

impl DimensionBuilder {
    /// A fresh, unopened dimension context.
    #[must_use]
    pub fn context() -> DimensionContext {
        Context::new(Self::default())
    }
}

fn missing(field: &str) -> Error {
    Error::MissingFields {
        context: DimensionBuilder::KIND,
        missing: field.to_string(),
    }
}

impl Builder for DimensionBuilder {
    type Field = DimensionField;
    type Output = Dimension;

    const KIND: &'static str = "dimension";
    const REQUIRED: DimensionField = DimensionField::NAME
        .union(DimensionField::PRIMITIVE_TYPE)
        .union(DimensionField::DIMENSION_TYPE)
        .union(DimensionField::DIRECTION);

    fn build(&mut self) -> Result<Dimension> {
        let primitive_type = self.primitive_type.ok_or_else(|| missing("PRIMITIVE_TYPE"))?;
        let parser = self
            .parser
            .take()
            .unwrap_or_else(|| default_parser(primitive_type));
        Dimension::new(
            self.named.name(Self::KIND)?,
            self.named.description(),
            primitive_type,
            self.dimension_type.ok_or_else(|| missing("DIMENSION_TYPE"))?,
            self.direction.ok_or_else(|| missing("DIRECTION"))?,
            parser,
            self.lower,
            self.upper,
        )
    }
}

impl Context<DimensionBuilder> {
    /// Set the name.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, [`Error::FieldAlreadySet`], or
    /// [`Error::InvalidArgument`] for a blank name.
    pub fn set_name(&self, name: &str) -> Result<()> {
        self.assign(DimensionField::NAME, |b| b.named.set_name(name))
    }

    /// Append a description fragment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn add_description(&self, fragment: &str) -> Result<()> {
        self.update(DimensionField::DESCRIPTION, |b| {
            b.named.add_description(fragment);
            Ok(())
        })
    }

    /// Set the primitive type.
    ///
    /// # Errors
    ///
    /// Lifecycle errors or [`Error::FieldAlreadySet`].
    pub fn set_primitive_type(&self, primitive_type: PrimitiveType) -> Result<()> {
        self.assign(DimensionField::PRIMITIVE_TYPE, |b| {
            b.primitive_type = Some(primitive_type);
            Ok(())
        })
    }

    /// Set the dimension type.
    ///
    /// # Errors
    ///
    /// Lifecycle errors or [`Error::FieldAlreadySet`].
    pub fn set_dimension_type(&self, dimension_type: DimensionType) -> Result<()> {
        self.assign(DimensionField::DIMENSION_TYPE, |b| {
            b.dimension_type = Some(dimension_type);
            Ok(())
        })
    }

    /// Set the direction.
    ///
    /// # Errors
    ///
    /// Lifecycle errors or [`Error::FieldAlreadySet`].
    pub fn set_direction(&self, direction: DimensionDirection) -> Result<()> {
        self.assign(DimensionField::DIRECTION, |b| {
            b.direction = Some(direction);
            Ok(())
        })
    }

    /// Set the value parser. Defaults to the unbounded parser of the
    /// primitive type.
    ///
    /// # Errors
    ///
    /// Lifecycle errors or [`Error::FieldAlreadySet`].
    pub fn set_parser(&self, parser: Arc<dyn NumberParser>) -> Result<()> {
        self.assign(DimensionField::PARSER, |b| {
            b.parser = Some(parser);
            Ok(())
        })
    }

    /// Set the default lower bound of instances.
    ///
    /// # Errors
    ///
    /// Lifecycle errors or [`Error::FieldAlreadySet`].
    pub fn set_lower_bound(&self, value: impl Into<NumericValue>) -> Result<()> {
        let value = value.into();
        self.assign(DimensionField::LOWER, |b| {
            b.lower = Some(value);
            Ok(())
        })
    }

    /// Set the default upper bound of instances.
    ///
    /// # Errors
    ///
    /// Lifecycle errors or [`Error::FieldAlreadySet`].
    pub fn set_upper_bound(&self, value: impl Into<NumericValue>) -> Result<()> {
        let value = value.into();
        self.assign(DimensionField::UPPER, |b| {
            b.upper = Some(value);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::State;
    use crate::id::NamedIdObject;
    use crate::parser::IntegerParser;

    fn opened() -> DimensionContext {
        let ctx = DimensionBuilder::context();
        ctx.open().unwrap();
        ctx.set_name(" FEs ").unwrap();
        ctx.set_primitive_type(PrimitiveType::Int).unwrap();
        ctx.set_dimension_type(DimensionType::IterationFe).unwrap();
        ctx.set_direction(DimensionDirection::IncreasingStrictly)
            .unwrap();
        ctx
    }

    #[test]
    fn test_build_with_defaults() {
        let ctx = opened();
        ctx.add_description("Function evaluations").unwrap();
        ctx.add_description("Counted from one").unwrap();
        let dim = ctx.finish().unwrap();
        assert_eq!(ctx.state(), State::Compiled);
        assert_eq!(dim.name(), "FEs");
        assert_eq!(
            dim.description(),
            Some("Function evaluations. Counted from one")
        );
        assert_eq!(dim.default_lower(), NumericValue::Int(i32::MIN));
        assert_eq!(dim.parser().output_type(), PrimitiveType::Int);
    }

    #[test]
    fn test_bounds_and_parser() {
        let ctx = opened();
        ctx.set_parser(Arc::new(IntegerParser::new(PrimitiveType::Int, 1, 100).unwrap()))
            .unwrap();
        ctx.set_upper_bound(50_i64).unwrap();
        let dim = ctx.finish().unwrap();
        assert_eq!(dim.default_lower(), NumericValue::Int(1));
        assert_eq!(dim.default_upper(), NumericValue::Int(50));
    }

    #[test]
    fn test_set_once() {
        let ctx = opened();
        assert!(matches!(
            ctx.set_name("other"),
            Err(Error::FieldAlreadySet { .. })
        ));
    }

    #[test]
    fn test_missing_fields() {
        let ctx = DimensionBuilder::context();
        ctx.open().unwrap();
        ctx.set_name("t").unwrap();
        ctx.close().unwrap();
        match ctx.compile() {
            Err(Error::MissingFields { context, missing }) => {
                assert_eq!(context, "dimension");
                assert_eq!(missing, "PRIMITIVE_TYPE, DIMENSION_TYPE, DIRECTION");
            }
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn test_setter_requires_open() {
        let ctx = DimensionBuilder::context();
        assert!(matches!(ctx.set_name("t"), Err(Error::Lifecycle { .. })));
        let ctx = opened();
        ctx.close().unwrap();
        assert!(matches!(
            ctx.set_lower_bound(1_i32),
            Err(Error::Lifecycle { .. })
        ));
    }

    #[test]
    fn test_leaf_rejects_children() {
        let ctx = opened();
        assert!(matches!(
            ctx.open_child(DimensionBuilder::default()),
            Err(Error::ChildNotAllowed("dimension"))
        ));
    }

    #[test]
    fn test_blank_name_leaves_field_unset() {
        let ctx = DimensionBuilder::context();
        ctx.open().unwrap();
        assert!(ctx.set_name("  ").is_err());
        ctx.set_name("t").unwrap();
    }

    #[test]
    fn test_failed_build_is_terminal() {
        let ctx = opened();
        ctx.set_lower_bound(10_i32).unwrap();
        ctx.set_upper_bound(5_i32).unwrap();
        ctx.close().unwrap();
        assert!(matches!(ctx.compile(), Err(Error::OutOfRange { .. })));
        assert_eq!(ctx.state(), State::Compiling);
        assert!(matches!(ctx.compile(), Err(Error::Lifecycle { .. })));
        assert!(ctx.result().is_err());
    }
}
