//! Property sets and setting resolution

use std::fmt;
use std::ops::Deref;

use rustc_hash::FxHashMap;

use super::{Property, PropertyKind, PropertySetting, PropertyValue, Value};
use crate::dataset::{Arrangement, DataSet};
use crate::id::{names_equivalent, IdObject, NamedIdObject, SetHandle};
use crate::{Error, Result};

/// The properties of one kind in an experiment set, sorted by name.
#[derive(Debug, Clone)]
pub struct PropertySet<K> {
    properties: DataSet<Property<K>>,
}

impl<K: PropertyKind> PropertySet<K> {
    /// Build a set sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySet`] for no properties and
    /// [`Error::DuplicateElement`] for names that differ only in case.
    pub fn new(properties: Vec<Property<K>>) -> Result<Self> {
        Ok(Self {
            properties: DataSet::new(SetHandle::root(K::SET), properties, Arrangement::Sorted)?,
        })
    }

    /// Property with the given name, compared case-insensitively.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Property<K>> {
        self.properties
            .iter()
            .find(|p| names_equivalent(p.name(), name))
    }

    /// Resolve `(property name, value)` assignments into a full setting.
    ///
    /// Parameters left out are unspecified; every feature must be assigned.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] for an unknown property or a value the property
    ///   does not have
    /// * [`Error::InvalidArgument`] if a property is assigned twice or a
    ///   feature is left out
    pub fn setting(&self, assignments: &[(String, Value)]) -> Result<PropertySetting<K>> {
        let mut chosen: FxHashMap<usize, &PropertyValue<K>> = FxHashMap::default();
        for (name, value) in assignments {
            let property = self.find(name).ok_or_else(|| Error::NotFound {
                kind: K::LABEL,
                name: name.clone(),
            })?;
            let resolved = property.find_value(value).ok_or_else(|| Error::NotFound {
                kind: "property value",
                name: format!("{}={value}", property.name()),
            })?;
            if chosen.insert(property.index(), resolved).is_some() {
                return Err(Error::InvalidArgument(format!(
                    "{} '{}' is assigned more than once",
                    K::LABEL,
                    property.name()
                )));
            }
        }

        let values = self
            .properties
            .iter()
            .map(|property| match chosen.get(&property.index()) {
                Some(value) => Ok((*value).clone()),
                None => property.unspecified().cloned().ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "{} '{}' has no value",
                        K::LABEL,
                        property.name()
                    ))
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PropertySetting::new(self.id(), values))
    }
}

impl<K> Deref for PropertySet<K> {
    type Target = DataSet<Property<K>>;

    fn deref(&self) -> &DataSet<Property<K>> {
        &self.properties
    }
}

impl<K> IdObject for PropertySet<K> {
    fn id(&self) -> u64 {
        self.properties.id()
    }

    fn path(&self) -> &str {
        self.properties.path()
    }
}

impl<K> fmt::Display for PropertySet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path(), self.id())
    }
}
