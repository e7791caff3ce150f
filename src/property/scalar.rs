//! Concrete property values

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete feature or parameter value.
///
/// Values order by kind first (booleans, numbers, text), then by value.
/// Integers and reals share one numeric order; on a numeric tie the integer
/// comes first. Reals use their total order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag
    Bool(bool),
    /// Integer
    Long(i64),
    /// Real number
    Double(f64),
    /// Free text
    Text(String),
}

impl Scalar {
    /// Best-effort interpretation of text: boolean, then integer, then real,
    /// else the trimmed text itself.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(v) = text.parse::<i64>() {
            return Self::Long(v);
        }
        match text.parse::<f64>() {
            Ok(v) if !v.is_nan() => Self::Double(v),
            _ => Self::Text(text.to_string()),
        }
    }

    /// Equality that also matches integers against reals of the same value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Long(a), Self::Double(b)) | (Self::Double(b), Self::Long(a)) => {
                b.fract() == 0.0 && *a as f64 == *b && (*b as i64) == *a
            }
            (Self::Text(a), Self::Text(b)) => a.trim() == b.trim(),
            _ => self == other,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Long(_) | Self::Double(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn widen(value: i64) -> f64 {
    value as f64
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Long(a), Self::Long(b)) => a.cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (Self::Long(a), Self::Double(b)) => widen(*a).total_cmp(b).then(Ordering::Less),
            (Self::Double(a), Self::Long(b)) => a.total_cmp(&widen(*b)).then(Ordering::Greater),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
