//! Primitive column types and typed numeric values

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive numeric type of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit IEEE float
    Float,
    /// 64-bit IEEE float
    Double,
}

impl PrimitiveType {
    /// All six types, narrowest integer first.
    pub const ALL: [Self; 6] = [
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Whether values of this type are integers.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    /// Lowercase type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Smallest representable value.
    #[must_use]
    pub const fn min_value(self) -> NumericValue {
        match self {
            Self::Byte => NumericValue::Byte(i8::MIN),
            Self::Short => NumericValue::Short(i16::MIN),
            Self::Int => NumericValue::Int(i32::MIN),
            Self::Long => NumericValue::Long(i64::MIN),
            Self::Float => NumericValue::Float(f32::NEG_INFINITY),
            Self::Double => NumericValue::Double(f64::NEG_INFINITY),
        }
    }

    /// Largest representable value.
    #[must_use]
    pub const fn max_value(self) -> NumericValue {
        match self {
            Self::Byte => NumericValue::Byte(i8::MAX),
            Self::Short => NumericValue::Short(i16::MAX),
            Self::Int => NumericValue::Int(i32::MAX),
            Self::Long => NumericValue::Long(i64::MAX),
            Self::Float => NumericValue::Float(f32::INFINITY),
            Self::Double => NumericValue::Double(f64::INFINITY),
        }
    }

    /// Convert `value` to this type, truncating like a primitive cast.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cast(self, value: NumericValue) -> NumericValue {
        match self {
            Self::Byte => NumericValue::Byte(value.as_long() as i8),
            Self::Short => NumericValue::Short(value.as_long() as i16),
            Self::Int => NumericValue::Int(value.as_long() as i32),
            Self::Long => NumericValue::Long(value.as_long()),
            Self::Float => NumericValue::Float(value.as_double() as f32),
            Self::Double => NumericValue::Double(value.as_double()),
        }
    }

    /// Convert `value` to this type only if no information is lost.
    #[must_use]
    pub fn convert_exact(self, value: NumericValue) -> Option<NumericValue> {
        if value.primitive_type() == self {
            return Some(value);
        }
        let converted = self.cast(value);
        let lossless = if value.primitive_type().is_integer() {
            if self.is_integer() {
                converted.as_long() == value.as_long()
            } else {
                // the integer must survive the trip through the float type
                let d = converted.as_double();
                #[allow(clippy::cast_possible_truncation)]
                let back = d as i64;
                in_long_range(d) && back == value.as_long()
            }
        } else if self.is_integer() {
            let v = value.as_double();
            #[allow(clippy::cast_precision_loss)]
            let back = converted.as_long() as f64;
            in_long_range(v) && v.fract() == 0.0 && back == v
        } else {
            converted.as_double().to_bits() == value.as_double().to_bits()
                || (converted.as_double().is_nan() && value.as_double().is_nan())
        };
        lossless.then_some(converted)
    }
}

/// 2^63, the first `f64` above `i64::MAX`.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

fn in_long_range(v: f64) -> bool {
    v.is_finite() && v >= -TWO_POW_63 && v < TWO_POW_63
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A number tagged with its primitive type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NumericValue {
    /// `byte` value
    Byte(i8),
    /// `short` value
    Short(i16),
    /// `int` value
    Int(i32),
    /// `long` value
    Long(i64),
    /// `float` value
    Float(f32),
    /// `double` value
    Double(f64),
}

impl NumericValue {
    /// The value's primitive type.
    #[must_use]
    pub const fn primitive_type(self) -> PrimitiveType {
        match self {
            Self::Byte(_) => PrimitiveType::Byte,
            Self::Short(_) => PrimitiveType::Short,
            Self::Int(_) => PrimitiveType::Int,
            Self::Long(_) => PrimitiveType::Long,
            Self::Float(_) => PrimitiveType::Float,
            Self::Double(_) => PrimitiveType::Double,
        }
    }

    /// Value as `i64`; floating point values are truncated (saturating).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_long(self) -> i64 {
        match self {
            Self::Byte(v) => i64::from(v),
            Self::Short(v) => i64::from(v),
            Self::Int(v) => i64::from(v),
            Self::Long(v) => v,
            Self::Float(v) => v as i64,
            Self::Double(v) => v as i64,
        }
    }

    /// Value as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_double(self) -> f64 {
        match self {
            Self::Byte(v) => f64::from(v),
            Self::Short(v) => f64::from(v),
            Self::Int(v) => f64::from(v),
            Self::Long(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }

    /// Total order: integers natively, anything involving a float by
    /// [`f64::total_cmp`], so NaN and signed zeros order consistently.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            _ if self.primitive_type().is_integer() && other.primitive_type().is_integer() => {
                self.as_long().cmp(&other.as_long())
            }
            _ => self.as_double().total_cmp(&other.as_double()),
        }
    }

    /// Equality under [`NumericValue::total_cmp`].
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl PartialEq for NumericValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for NumericValue {}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! numeric_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for NumericValue {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

numeric_from!(i8 => Byte, i16 => Short, i32 => Int, i64 => Long, f32 => Float, f64 => Double);
