//! Instance builder

use std::sync::Arc;

use bitflags::bitflags;

use super::named::NamedFields;
use super::{Builder, Context};
use crate::dimension::DimensionSet;
use crate::id::{names_equivalent, NamedIdObject};
use crate::instance::resolve_bounds;
use crate::property::Value;
use crate::storage::NumericValue;
use crate::{Error, Result};

bitflags! {
    /// Fields of an [`InstanceBuilder`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InstanceField: u8 {
        /// Name
        const NAME = 1;
        /// Description fragments
        const DESCRIPTION = 1 << 1;
        /// Feature values
        const FEATURE = 1 << 2;
        /// Per-dimension lower bounds
        const LOWER = 1 << 3;
        /// Per-dimension upper bounds
        const UPPER = 1 << 4;
    }
}

/// A compiled instance waiting for its experiment set: features are still
/// `(name, value)` pairs because the feature set is gathered from all
/// instances at once.
#[derive(Debug, Clone)]
pub struct InstanceDraft {
    /// Normalized name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Feature assignments in the order given
    pub features: Vec<(String, Value)>,
    /// Resolved lower bounds, one per dimension
    pub lower: Vec<NumericValue>,
    /// Resolved upper bounds, one per dimension
    pub upper: Vec<NumericValue>,
}

/// Accumulates the fields of an instance.
#[derive(Debug)]
pub struct InstanceBuilder {
    dimensions: Arc<DimensionSet>,
    named: NamedFields,
    features: Vec<(String, Value)>,
    lower: Vec<Option<NumericValue>>,
    upper: Vec<Option<NumericValue>>,
}

/// Context building one instance.
pub type InstanceContext = Context<InstanceBuilder>;

impl InstanceBuilder {
    /// Builder for an instance over `dimensions`.
    #[must_use]
    pub fn new(dimensions: Arc<DimensionSet>) -> Self {
        let n = dimensions.len();
        Self {
            dimensions,
            named: NamedFields::default(),
            features: Vec::new(),
            lower: vec![None; n],
            upper: vec![None; n],
        }
    }

    /// A fresh, unopened instance context over `dimensions`.
    #[must_use]
    pub fn context(dimensions: Arc<DimensionSet>) -> InstanceContext {
        Context::new(Self::new(dimensions))
    }

    fn column(&self, dimension: &str) -> Result<usize> {
        self.dimensions
            .find(dimension)
            .map(|d| d.index())
            .ok_or_else(|| Error::NotFound {
                kind: "dimension",
                name: dimension.to_string(),
            })
    }

    fn set_bound(&mut self, lower: bool, dimension: &str, value: NumericValue) -> Result<()> {
        let column = self.column(dimension)?;
        let slot = if lower {
            &mut self.lower[column]
        } else {
            &mut self.upper[column]
        };
        if slot.is_some() {
            return Err(Error::FieldAlreadySet {
                context: Self::KIND,
                field: format!(
                    "{} bound of '{}'",
                    if lower { "lower" } else { "upper" },
                    dimension
                ),
            });
        }
        *slot = Some(value);
        Ok(())
    }
}

impl Builder for InstanceBuilder {
    type Field = InstanceField;
    type Output = InstanceDraft;

    const KIND: &'static str = "instance";
    const REQUIRED: InstanceField = InstanceField::NAME;

    fn build(&mut self) -> Result<InstanceDraft> {
        let (lower, upper) = resolve_bounds(&self.dimensions, &self.lower, &self.upper)?;
        Ok(InstanceDraft {
            name: self.named.name(Self::KIND)?.to_string(),
            description: self.named.description(),
            features: std::mem::take(&mut self.features),
            lower,
            upper,
        })
    }
}

impl Context<InstanceBuilder> {
    /// Set the name.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, [`Error::FieldAlreadySet`], or
    /// [`Error::InvalidArgument`] for a blank name.
    pub fn set_name(&self, name: &str) -> Result<()> {
        self.assign(InstanceField::NAME, |b| b.named.set_name(name))
    }

    /// Append a description fragment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn add_description(&self, fragment: &str) -> Result<()> {
        self.update(InstanceField::DESCRIPTION, |b| {
            b.named.add_description(fragment);
            Ok(())
        })
    }

    /// Assign a feature value.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, or [`Error::FieldAlreadySet`] if the feature was
    /// already assigned.
    pub fn set_feature(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update(InstanceField::FEATURE, |b| {
            if b.features.iter().any(|(n, _)| names_equivalent(n, name)) {
                return Err(Error::FieldAlreadySet {
                    context: InstanceBuilder::KIND,
                    field: format!("feature '{name}'"),
                });
            }
            b.features.push((name.trim().to_string(), value));
            Ok(())
        })
    }

    /// Set the lower bound in the named dimension.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, [`Error::NotFound`] for an unknown dimension, or
    /// [`Error::FieldAlreadySet`].
    pub fn set_lower_bound(&self, dimension: &str, value: impl Into<NumericValue>) -> Result<()> {
        let value = value.into();
        self.update(InstanceField::LOWER, |b| b.set_bound(true, dimension, value))
    }

    /// Set the upper bound in the named dimension.
    ///
    /// # Errors
    ///
    /// Lifecycle errors, [`Error::NotFound`] for an unknown dimension, or
    /// [`Error::FieldAlreadySet`].
    pub fn set_upper_bound(&self, dimension: &str, value: impl Into<NumericValue>) -> Result<()> {
        let value = value.into();
        self.update(InstanceField::UPPER, |b| b.set_bound(false, dimension, value))
    }

    /// Names of the dimensions bounds can be set for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`] unless open.
    pub fn dimension_names(&self) -> Result<Vec<String>> {
        self.inspect(|b| Ok(b.dimensions.iter().map(|d| d.name().to_string()).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{Dimension, DimensionDirection, DimensionType};
    use crate::parser::default_parser;
    use crate::storage::PrimitiveType;

    fn dimensions() -> Arc<DimensionSet> {
        let dim = |name: &str, t: PrimitiveType| {
            Dimension::new(
                name,
                None,
                t,
                DimensionType::RuntimeCpu,
                DimensionDirection::Increasing,
                default_parser(t),
                Some(NumericValue::Long(0)),
                None,
            )
            .unwrap()
        };
        Arc::new(
            DimensionSet::new(vec![
                dim("time", PrimitiveType::Long),
                dim("fes", PrimitiveType::Int),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_build_draft() {
        let ctx = InstanceBuilder::context(dimensions());
        ctx.open().unwrap();
        ctx.set_name("tsp-100").unwrap();
        ctx.set_feature("n", 100_i64).unwrap();
        ctx.set_feature("symmetric", true).unwrap();
        ctx.set_upper_bound("FES", 5000_i32).unwrap();
        assert_eq!(ctx.dimension_names().unwrap(), vec!["time", "fes"]);
        let draft = ctx.finish().unwrap();
        assert_eq!(draft.name, "tsp-100");
        assert_eq!(draft.features.len(), 2);
        assert_eq!(draft.lower, vec![NumericValue::Long(0), NumericValue::Int(0)]);
        assert_eq!(draft.upper[0], NumericValue::Long(i64::MAX));
        assert_eq!(draft.upper[1], NumericValue::Int(5000));
    }

    #[test]
    fn test_unknown_dimension() {
        let ctx = InstanceBuilder::context(dimensions());
        ctx.open().unwrap();
        assert!(matches!(
            ctx.set_lower_bound("quality", 1_i64),
            Err(Error::NotFound { kind: "dimension", .. })
        ));
    }

    #[test]
    fn test_feature_assigned_twice() {
        let ctx = InstanceBuilder::context(dimensions());
        ctx.open().unwrap();
        ctx.set_feature("n", 1_i64).unwrap();
        assert!(matches!(
            ctx.set_feature("N", 2_i64),
            Err(Error::FieldAlreadySet { .. })
        ));
    }

    #[test]
    fn test_bound_assigned_twice() {
        let ctx = InstanceBuilder::context(dimensions());
        ctx.open().unwrap();
        ctx.set_lower_bound("time", 1_i64).unwrap();
        assert!(matches!(
            ctx.set_lower_bound("time", 2_i64),
            Err(Error::FieldAlreadySet { .. })
        ));
    }

    #[test]
    fn test_invalid_bound_fails_compile() {
        let ctx = InstanceBuilder::context(dimensions());
        ctx.open().unwrap();
        ctx.set_name("x").unwrap();
        ctx.set_lower_bound("fes", 10_i32).unwrap();
        ctx.set_upper_bound("fes", 5_i32).unwrap();
        ctx.close().unwrap();
        assert!(matches!(ctx.compile(), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_leaf_rejects_children() {
        let ctx = InstanceBuilder::context(dimensions());
        ctx.open().unwrap();
        assert!(matches!(
            ctx.open_child(InstanceBuilder::new(dimensions())),
            Err(Error::ChildNotAllowed("instance"))
        ));
    }
}
