//! Benchmark instances

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

use crate::dataset::{Arrangement, DataSet, SetElement, SetMember};
use crate::dimension::DimensionSet;
use crate::id::{
    compare_names, names_equivalent, normalize_name, IdObject, Membership, NamedIdObject,
    SetHandle, SetKind,
};
use crate::property::FeatureSetting;
use crate::storage::NumericValue;
use crate::{Error, Result};

/// A problem instance with its features and per-dimension bounds.
#[derive(Debug, Clone)]
pub struct Instance {
    membership: Membership,
    name: String,
    description: Option<String>,
    features: FeatureSetting,
    lower: Box<[NumericValue]>,
    upper: Box<[NumericValue]>,
}

impl Instance {
    /// Create a detached instance with already resolved bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a blank name or if the bound
    /// arrays differ in length.
    pub fn new(
        name: &str,
        description: Option<String>,
        features: FeatureSetting,
        lower: Vec<NumericValue>,
        upper: Vec<NumericValue>,
    ) -> Result<Self> {
        let name = normalize_name(name)?;
        if lower.len() != upper.len() {
            return Err(Error::InvalidArgument(format!(
                "instance '{name}' has {} lower but {} upper bounds",
                lower.len(),
                upper.len()
            )));
        }
        Ok(Self {
            membership: Membership::detached(&name),
            name,
            description,
            features,
            lower: lower.into_boxed_slice(),
            upper: upper.into_boxed_slice(),
        })
    }

    /// Feature values of this instance.
    #[must_use]
    pub const fn features(&self) -> &FeatureSetting {
        &self.features
    }

    /// Lower bound in dimension `column`.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    #[must_use]
    pub fn lower_bound(&self, column: usize) -> NumericValue {
        self.lower[column]
    }

    /// Upper bound in dimension `column`.
    ///
    /// # Panics
    ///
    /// Panics if `column` is out of range.
    #[must_use]
    pub fn upper_bound(&self, column: usize) -> NumericValue {
        self.upper[column]
    }

    /// Position in the owning set.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.membership.index()
    }
}

/// Fill unset bounds from the dimensions' defaults and check the rest.
///
/// `lower` and `upper` are indexed by dimension.
///
/// # Errors
///
/// * [`Error::InvalidArgument`] if the arrays do not match the dimensions
/// * [`Error::FidelityLoss`] if a bound is not representable in its dimension
/// * [`Error::OutOfRange`] if the dimension parser rejects a bound or
///   `lower > upper`
pub fn resolve_bounds(
    dimensions: &DimensionSet,
    lower: &[Option<NumericValue>],
    upper: &[Option<NumericValue>],
) -> Result<(Vec<NumericValue>, Vec<NumericValue>)> {
    if lower.len() != dimensions.len() || upper.len() != dimensions.len() {
        return Err(Error::InvalidArgument(format!(
            "expected bounds for {} dimensions",
            dimensions.len()
        )));
    }
    let mut resolved_lower = Vec::with_capacity(dimensions.len());
    let mut resolved_upper = Vec::with_capacity(dimensions.len());
    for (index, dimension) in dimensions.iter().enumerate() {
        let resolve = |given: Option<NumericValue>, fallback: NumericValue| -> Result<NumericValue> {
            let Some(value) = given else {
                return Ok(fallback);
            };
            let exact = dimension
                .primitive_type()
                .convert_exact(value)
                .ok_or_else(|| {
                    Error::FidelityLoss(format!(
                        "bound {value} is not representable in dimension '{}'",
                        dimension.name()
                    ))
                })?;
            dimension.parser().validate(&exact)?;
            Ok(exact)
        };
        let low = resolve(lower[index], dimension.default_lower())?;
        let high = resolve(upper[index], dimension.default_upper())?;
        if low.total_cmp(&high) == Ordering::Greater {
            return Err(Error::OutOfRange {
                target: format!("bounds in dimension '{}'", dimension.name()),
                value: format!("[{low}, {high}]"),
                lower: dimension.default_lower().to_string(),
                upper: dimension.default_upper().to_string(),
            });
        }
        resolved_lower.push(low);
        resolved_upper.push(high);
    }
    Ok((resolved_lower, resolved_upper))
}

impl IdObject for Instance {
    fn id(&self) -> u64 {
        self.membership.index() as u64
    }

    fn path(&self) -> &str {
        self.membership.path()
    }
}

impl NamedIdObject for Instance {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.membership.path())
    }
}

impl SetElement for Instance {
    fn compare(&self, other: &Self) -> Ordering {
        compare_names(&self.name, &other.name)
    }

    fn equivalent(&self, other: &Self) -> bool {
        names_equivalent(&self.name, &other.name)
    }
}

impl SetMember for Instance {
    fn bind(&mut self, owner: &SetHandle, index: usize) {
        self.membership = Membership::within(owner, index, &self.name);
    }
}

/// All instances of an experiment set, sorted by name.
#[derive(Debug, Clone)]
pub struct InstanceSet {
    instances: DataSet<Instance>,
}

impl InstanceSet {
    /// Build a set sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySet`] for no instances and
    /// [`Error::DuplicateElement`] for names that differ only in case.
    pub fn new(instances: Vec<Instance>) -> Result<Self> {
        Ok(Self {
            instances: DataSet::new(
                SetHandle::root(SetKind::Instances),
                instances,
                Arrangement::Sorted,
            )?,
        })
    }

    /// Instance with the given name, compared case-insensitively.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Instance> {
        self.instances
            .search_by(|instance| compare_names(&instance.name, name))
            .or_else(|| self.instances.iter().find(|i| names_equivalent(&i.name, name)))
    }
}

impl Deref for InstanceSet {
    type Target = DataSet<Instance>;

    fn deref(&self) -> &DataSet<Instance> {
        &self.instances
    }
}

impl IdObject for InstanceSet {
    fn id(&self) -> u64 {
        self.instances.id()
    }

    fn path(&self) -> &str {
        self.instances.path()
    }
}
