//! Property model
//!
//! Instances carry *features*, experiments carry *parameters*. Each property
//! owns its sorted concrete values plus sentinels: every property has a
//! *generalized* value that stands for "any value", and parameters also have
//! an *unspecified* value for experiments that never set them.

mod scalar;
mod set;
mod setting;

pub use scalar::Scalar;
pub use set::PropertySet;
pub use setting::PropertySetting;

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::dataset::{validate_elements, SetElement, SetMember};
use crate::id::{
    compare_names, names_equivalent, normalize_name, IdObject, Membership, NamedIdObject,
    SetHandle, SetKind,
};
use crate::Result;

/// The value a property takes in one setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Matches any value of the property
    Generalized,
    /// The property was not set
    Unspecified,
    /// An actual value
    Concrete(Scalar),
}

impl Value {
    const fn rank(&self) -> u8 {
        match self {
            Self::Concrete(_) => 0,
            Self::Generalized => 1,
            Self::Unspecified => 2,
        }
    }

    /// The concrete value, if any.
    #[must_use]
    pub const fn scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Concrete(s) => Some(s),
            _ => None,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Concrete(a), Self::Concrete(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generalized => f.write_str("generalized"),
            Self::Unspecified => f.write_str("unspecified"),
            Self::Concrete(s) => s.fmt(f),
        }
    }
}

macro_rules! concrete_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::Concrete(Scalar::from(value))
            }
        })*
    };
}

concrete_from!(bool, i64, f64, &str, String);

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Self::Concrete(value)
    }
}

/// Distinguishes features from parameters at the type level.
pub trait PropertyKind: fmt::Debug + Clone + Copy + Send + Sync + 'static {
    /// Id counter of sets of this kind.
    const SET: SetKind;
    /// Whether properties have an unspecified sentinel.
    const HAS_UNSPECIFIED: bool;
    /// Human-readable kind name.
    const LABEL: &'static str;
}

/// Marker for instance features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureKind;

impl PropertyKind for FeatureKind {
    const SET: SetKind = SetKind::Features;
    const HAS_UNSPECIFIED: bool = false;
    const LABEL: &'static str = "feature";
}

/// Marker for experiment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterKind;

impl PropertyKind for ParameterKind {
    const SET: SetKind = SetKind::Parameters;
    const HAS_UNSPECIFIED: bool = true;
    const LABEL: &'static str = "parameter";
}

/// A value owned by exactly one property.
///
/// Concrete values are indexed `0..n` in sorted order; the generalized
/// sentinel has index `n`, the unspecified sentinel `n + 1`.
#[derive(Debug, Clone)]
pub struct PropertyValue<K> {
    set: u64,
    membership: Membership,
    value: Value,
    name: String,
    _kind: PhantomData<K>,
}

impl<K: PropertyKind> PropertyValue<K> {
    fn new(value: Value) -> Self {
        let name = value.to_string();
        Self {
            set: 0,
            membership: Membership::detached(&name),
            value,
            name,
            _kind: PhantomData,
        }
    }

    /// The value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Index within the owning property.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.membership.index()
    }

    /// Index of the owning property within its set.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn property_index(&self) -> usize {
        // values are bound under a handle whose id is the property index
        self.membership.owner() as usize
    }

    /// Id of the property set the owning property belongs to, `0` while
    /// detached.
    #[must_use]
    pub const fn set_id(&self) -> u64 {
        self.set
    }

    /// Whether this is the generalized sentinel.
    #[must_use]
    pub const fn is_generalized(&self) -> bool {
        matches!(self.value, Value::Generalized)
    }

    /// Whether this is the unspecified sentinel.
    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        matches!(self.value, Value::Unspecified)
    }

    /// Whether both values belong to the same property.
    #[must_use]
    pub fn same_property(&self, other: &Self) -> bool {
        self.set == other.set && self.property_index() == other.property_index()
    }

    fn bind_value(&mut self, set: u64, owner: &SetHandle, index: usize) {
        self.set = set;
        self.membership = Membership::within(owner, index, &self.name);
    }
}

impl<K> IdObject for PropertyValue<K> {
    fn id(&self) -> u64 {
        self.membership.index() as u64
    }

    fn path(&self) -> &str {
        self.membership.path()
    }
}

impl<K> NamedIdObject for PropertyValue<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        None
    }
}

impl<K> fmt::Display for PropertyValue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.membership.path())
    }
}

impl<K> PartialEq for PropertyValue<K> {
    fn eq(&self, other: &Self) -> bool {
        self.set == other.set
            && self.membership.owner() == other.membership.owner()
            && self.value == other.value
    }
}

impl<K> Eq for PropertyValue<K> {}

impl<K> SetElement for PropertyValue<K> {
    fn compare(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }

    fn equivalent(&self, other: &Self) -> bool {
        self.value == other.value
            || names_equivalent(&self.name, &other.name)
            || matches!(
                (self.value.scalar(), other.value.scalar()),
                (Some(a), Some(b)) if a.loosely_equals(b)
            )
    }
}

/// Anything a property value can be looked up by.
#[derive(Debug, Clone)]
pub enum ValueQuery<'a, K> {
    /// The generalized sentinel
    Generalized,
    /// The unspecified sentinel
    Unspecified,
    /// A concrete value
    Scalar(Scalar),
    /// A value name or textual form
    Text(&'a str),
    /// A value previously returned by some property
    Value(&'a PropertyValue<K>),
}

impl<K> From<Value> for ValueQuery<'_, K> {
    fn from(value: Value) -> Self {
        match value {
            Value::Generalized => Self::Generalized,
            Value::Unspecified => Self::Unspecified,
            Value::Concrete(s) => Self::Scalar(s),
        }
    }
}

impl<'a, K> From<&'a Value> for ValueQuery<'a, K> {
    fn from(value: &'a Value) -> Self {
        Self::from(value.clone())
    }
}

impl<K> From<Scalar> for ValueQuery<'_, K> {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl<'a, K> From<&'a str> for ValueQuery<'a, K> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a, K> From<&'a PropertyValue<K>> for ValueQuery<'a, K> {
    fn from(value: &'a PropertyValue<K>) -> Self {
        Self::Value(value)
    }
}

/// A named property with its admissible values.
#[derive(Debug, Clone)]
pub struct Property<K> {
    membership: Membership,
    name: String,
    description: Option<String>,
    values: Box<[PropertyValue<K>]>,
    generalized: PropertyValue<K>,
    unspecified: Option<PropertyValue<K>>,
}

impl<K: PropertyKind> Property<K> {
    /// Create a detached property. Values are sorted; the list may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a
    /// blank name and
    /// [`Error::DuplicateElement`](crate::Error::DuplicateElement) if two
    /// values coincide.
    pub fn new(name: &str, description: Option<String>, values: Vec<Scalar>) -> Result<Self> {
        let name = normalize_name(name)?;
        let mut values: Vec<PropertyValue<K>> = values
            .into_iter()
            .map(|v| PropertyValue::new(Value::Concrete(v)))
            .collect();
        values.sort_by(SetElement::compare);
        validate_elements(&name, &values)?;

        let mut property = Self {
            membership: Membership::detached(&name),
            name,
            description,
            values: values.into_boxed_slice(),
            generalized: PropertyValue::new(Value::Generalized),
            unspecified: K::HAS_UNSPECIFIED.then(|| PropertyValue::new(Value::Unspecified)),
        };
        property.bind_values(0);
        Ok(property)
    }

    /// Concrete values in sorted order.
    #[must_use]
    pub fn values(&self) -> &[PropertyValue<K>] {
        &self.values
    }

    /// The generalized sentinel.
    #[must_use]
    pub const fn generalized(&self) -> &PropertyValue<K> {
        &self.generalized
    }

    /// The unspecified sentinel; parameters only.
    #[must_use]
    pub const fn unspecified(&self) -> Option<&PropertyValue<K>> {
        self.unspecified.as_ref()
    }

    /// Position in the owning set.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.membership.index()
    }

    /// Resolve `query` to the canonical value owned by this property.
    ///
    /// Sentinels resolve directly. A value of this property matches by index,
    /// any other value by its content. Scalars and text are first binary
    /// searched, then compared linearly against every value and name,
    /// including a re-parse of the text. Nothing matching yields `None`.
    #[must_use]
    pub fn find_value<'a>(&self, query: impl Into<ValueQuery<'a, K>>) -> Option<&PropertyValue<K>> {
        match query.into() {
            ValueQuery::Generalized => Some(&self.generalized),
            ValueQuery::Unspecified => self.unspecified.as_ref(),
            ValueQuery::Value(v) => {
                if self.owns(v) {
                    let own = match v.value {
                        Value::Concrete(_) => self.values.get(v.index()),
                        Value::Generalized => Some(&self.generalized),
                        Value::Unspecified => self.unspecified.as_ref(),
                    };
                    if let Some(own) = own.filter(|own| own.value == v.value) {
                        return Some(own);
                    }
                }
                self.find_value(ValueQuery::from(v.value.clone()))
            }
            ValueQuery::Scalar(s) => self.search(&s).or_else(|| self.scan(&s)),
            ValueQuery::Text(text) => {
                let raw = Scalar::from(text);
                self.search(&raw)
                    .or_else(|| self.search(&Scalar::parse(text)))
                    .or_else(|| self.scan(&raw))
            }
        }
    }

    fn owns(&self, value: &PropertyValue<K>) -> bool {
        value.set == self.generalized.set
            && value.property_index() == self.generalized.property_index()
    }

    fn search(&self, scalar: &Scalar) -> Option<&PropertyValue<K>> {
        self.values
            .binary_search_by(|candidate| match candidate.value.scalar() {
                Some(own) => own.cmp(scalar),
                None => Ordering::Greater,
            })
            .ok()
            .map(|index| &self.values[index])
    }

    fn scan(&self, scalar: &Scalar) -> Option<&PropertyValue<K>> {
        let text = scalar.to_string();
        let reparsed = Scalar::parse(&text);
        self.values.iter().find(|candidate| {
            candidate.value.scalar().is_some_and(|own| {
                own.loosely_equals(scalar)
                    || own.loosely_equals(&reparsed)
                    || own.to_string().trim() == text.trim()
            }) || names_equivalent(&candidate.name, &text)
        })
    }

    fn bind_values(&mut self, set: u64) {
        let handle = SetHandle::nested(&self.membership);
        for (index, value) in self.values.iter_mut().enumerate() {
            value.bind_value(set, &handle, index);
        }
        let n = self.values.len();
        self.generalized.bind_value(set, &handle, n);
        if let Some(unspecified) = self.unspecified.as_mut() {
            unspecified.bind_value(set, &handle, n + 1);
        }
    }
}

impl<K> IdObject for Property<K> {
    fn id(&self) -> u64 {
        self.membership.index() as u64
    }

    fn path(&self) -> &str {
        self.membership.path()
    }
}

impl<K> NamedIdObject for Property<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl<K> fmt::Display for Property<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.membership.path())
    }
}

impl<K: PropertyKind> SetElement for Property<K> {
    fn compare(&self, other: &Self) -> Ordering {
        compare_names(&self.name, &other.name)
    }

    fn equivalent(&self, other: &Self) -> bool {
        names_equivalent(&self.name, &other.name)
    }
}

impl<K: PropertyKind> SetMember for Property<K> {
    fn bind(&mut self, owner: &SetHandle, index: usize) {
        self.membership = Membership::within(owner, index, &self.name);
        self.bind_values(owner.id());
    }
}

/// A feature of instances.
pub type Feature = Property<FeatureKind>;
/// A parameter of experiments.
pub type Parameter = Property<ParameterKind>;
/// A value of a feature.
pub type FeatureValue = PropertyValue<FeatureKind>;
/// A value of a parameter.
pub type ParameterValue = PropertyValue<ParameterKind>;
/// The features of an experiment set.
pub type FeatureSet = PropertySet<FeatureKind>;
/// The parameters of an experiment set.
pub type ParameterSet = PropertySet<ParameterKind>;
/// One value per feature.
pub type FeatureSetting = PropertySetting<FeatureKind>;
/// One value per parameter.
pub type ParameterSetting = PropertySetting<ParameterKind>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn algorithm() -> Parameter {
        Parameter::new(
            "algorithm",
            None,
            vec![Scalar::from("ga"), Scalar::from("hc"), Scalar::from("aco")],
        )
        .unwrap()
    }

    #[test]
    fn test_values_sorted() {
        let p = algorithm();
        let names: Vec<&str> = p.values().iter().map(NamedIdObject::name).collect();
        assert_eq!(names, vec!["aco", "ga", "hc"]);
        assert_eq!(p.values()[1].index(), 1);
        assert_eq!(p.generalized().index(), 3);
        assert_eq!(p.unspecified().unwrap().index(), 4);
    }

    #[test]
    fn test_feature_has_no_unspecified() {
        let f = Feature::new("n", None, vec![Scalar::Long(10)]).unwrap();
        assert!(f.unspecified().is_none());
        assert!(f.find_value(ValueQuery::Unspecified).is_none());
        assert!(f.find_value(ValueQuery::Generalized).unwrap().is_generalized());
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = Feature::new("n", None, vec![Scalar::Long(1), Scalar::Double(1.0)]);
        assert!(matches!(result, Err(Error::DuplicateElement { .. })));
    }

    #[test]
    fn test_find_by_scalar_and_text() {
        let p = algorithm();
        assert_eq!(p.find_value(Scalar::from("hc")).unwrap().index(), 2);
        assert_eq!(p.find_value("ga").unwrap().index(), 1);
        assert!(p.find_value("sa").is_none());
    }

    #[test]
    fn test_find_numeric_by_text() {
        let f = Feature::new("n", None, vec![Scalar::Long(10), Scalar::Long(200)]).unwrap();
        assert_eq!(f.find_value("200").unwrap().index(), 1);
        assert_eq!(f.find_value(Scalar::Double(10.0)).unwrap().index(), 0);
        assert_eq!(f.find_value(" 10 ").unwrap().index(), 0);
    }

    #[test]
    fn test_find_by_own_value() {
        let p = algorithm();
        let hc = p.find_value("hc").unwrap().clone();
        assert!(std::ptr::eq(p.find_value(&hc).unwrap(), &p.values()[2]));
    }

    #[test]
    fn test_find_by_foreign_value() {
        let p = algorithm();
        let other = Parameter::new("other", None, vec![Scalar::from("hc")]).unwrap();
        let foreign = other.find_value("hc").unwrap();
        assert_eq!(p.find_value(foreign).unwrap().index(), 2);
    }

    #[test]
    fn test_empty_property_only_sentinels() {
        let p = Parameter::new("seed", None, Vec::new()).unwrap();
        assert!(p.values().is_empty());
        assert!(p.find_value("1").is_none());
        assert!(p.find_value(Value::Unspecified).unwrap().is_unspecified());
    }
}
