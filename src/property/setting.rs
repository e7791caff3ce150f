//! One value per property

use std::cmp::Ordering;
use std::fmt;

use super::{PropertyKind, PropertySet, PropertyValue, Value};
use crate::id::IdObject;

/// The values of every property of one property set, indexed by property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySetting<K> {
    set: u64,
    values: Box<[PropertyValue<K>]>,
}

impl<K: PropertyKind> PropertySetting<K> {
    pub(super) fn new(set: u64, values: Vec<PropertyValue<K>>) -> Self {
        Self {
            set,
            values: values.into_boxed_slice(),
        }
    }

    /// Id of the property set this setting belongs to.
    #[must_use]
    pub const fn set_id(&self) -> u64 {
        self.set
    }

    /// Value of property `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> &PropertyValue<K> {
        &self.values[index]
    }

    /// All values in property order.
    #[must_use]
    pub fn values(&self) -> &[PropertyValue<K>] {
        &self.values
    }

    /// Value of the property named `name` in `properties`.
    #[must_use]
    pub fn value_of(&self, properties: &PropertySet<K>, name: &str) -> Option<&PropertyValue<K>> {
        if properties.id() != self.set {
            return None;
        }
        properties
            .find(name)
            .and_then(|property| self.values.get(property.index()))
    }

    /// Whether every value of `other` is matched by this setting: equal, or
    /// generalized here. Equal settings subsume each other.
    #[must_use]
    pub fn subsumes(&self, other: &Self) -> bool {
        self.set == other.set
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(mine, theirs)| mine.value() == &Value::Generalized || mine.value() == theirs.value())
    }

    /// Index-by-index comparison of the values.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a.value().cmp(b.value()))
            .find(|c| *c != Ordering::Equal)
            .unwrap_or_else(|| self.values.len().cmp(&other.values.len()))
    }
}

impl<K: PropertyKind> fmt::Display for PropertySetting<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| v.value().to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use crate::property::{Parameter, ParameterSet, Scalar, Value};

    fn parameters() -> ParameterSet {
        ParameterSet::new(vec![
            Parameter::new("algorithm", None, vec![Scalar::from("ga"), Scalar::from("hc")])
                .unwrap(),
            Parameter::new("restarts", None, vec![Scalar::Bool(false), Scalar::Bool(true)])
                .unwrap(),
        ])
        .unwrap()
    }

    fn assign(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_equal_settings_subsume() {
        let set = parameters();
        let a = set.setting(&assign(&[("algorithm", Value::from("hc"))])).unwrap();
        let b = set.setting(&assign(&[("algorithm", Value::from("hc"))])).unwrap();
        assert_eq!(a, b);
        assert!(a.subsumes(&b) && b.subsumes(&a));
        assert_eq!(a.compare(&b), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_generalized_subsumes() {
        let set = parameters();
        let any = set
            .setting(&assign(&[
                ("algorithm", Value::Generalized),
                ("restarts", Value::from(true)),
            ]))
            .unwrap();
        let hc = set
            .setting(&assign(&[
                ("algorithm", Value::from("hc")),
                ("restarts", Value::from(true)),
            ]))
            .unwrap();
        assert!(any.subsumes(&hc));
        assert!(!hc.subsumes(&any));
        assert_eq!(hc.compare(&any), std::cmp::Ordering::Less);
        assert_eq!(hc.to_string(), "[hc, true]");
    }

    #[test]
    fn test_distinct_settings() {
        let set = parameters();
        let ga = set.setting(&assign(&[("algorithm", Value::from("ga"))])).unwrap();
        let hc = set.setting(&assign(&[("algorithm", Value::from("hc"))])).unwrap();
        assert!(!ga.subsumes(&hc) && !hc.subsumes(&ga));
        assert_eq!(ga.compare(&hc), std::cmp::Ordering::Less);
    }
}
