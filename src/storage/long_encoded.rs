//! Generic storage strategy: every column is held as an `i64`
//!
//! Integer columns store the value itself. `float` columns store the IEEE
//! bits in the low 32 bits, `double` columns the full 64 bits. Decoding uses
//! the column's primitive type, so the round trip is exact for every declared
//! type, including signed zeros, infinities and NaN payloads.

use std::fmt;
use std::sync::Arc;

use super::{DataFactory, DataPoint, DataPointRef, NumericValue, PointLayout, PrimitiveType};
use crate::parser::NumberParser;

/// Encode `value` as stored in a column of type `primitive_type`.
///
/// Values of another type are first cast (truncated) to the column type.
#[must_use]
pub fn encode(primitive_type: PrimitiveType, value: NumericValue) -> i64 {
    match primitive_type.cast(value) {
        NumericValue::Byte(v) => i64::from(v),
        NumericValue::Short(v) => i64::from(v),
        NumericValue::Int(v) => i64::from(v),
        NumericValue::Long(v) => v,
        NumericValue::Float(v) => i64::from(v.to_bits()),
        #[allow(clippy::cast_possible_wrap)]
        NumericValue::Double(v) => v.to_bits() as i64,
    }
}

/// Decode a stored column value.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn decode(primitive_type: PrimitiveType, bits: i64) -> NumericValue {
    match primitive_type {
        PrimitiveType::Byte => NumericValue::Byte(bits as i8),
        PrimitiveType::Short => NumericValue::Short(bits as i16),
        PrimitiveType::Int => NumericValue::Int(bits as i32),
        PrimitiveType::Long => NumericValue::Long(bits),
        PrimitiveType::Float => NumericValue::Float(f32::from_bits(bits as u32)),
        PrimitiveType::Double => NumericValue::Double(f64::from_bits(bits as u64)),
    }
}

/// Data point holding one `i64` per column.
pub struct LongEncodedDataPoint {
    layout: Arc<PointLayout>,
    data: Box<[i64]>,
}

impl LongEncodedDataPoint {
    /// Encode `values` under `layout`.
    ///
    /// # Panics
    ///
    /// Panics if the arity differs from the layout.
    #[must_use]
    pub fn new(layout: Arc<PointLayout>, values: &[NumericValue]) -> Self {
        assert_eq!(
            values.len(),
            layout.len(),
            "data point arity must match its layout"
        );
        let data = values
            .iter()
            .zip(layout.columns())
            .map(|(value, column)| encode(column.primitive_type, *value))
            .collect();
        Self { layout, data }
    }

    /// Raw stored words.
    #[must_use]
    pub fn raw(&self) -> &[i64] {
        &self.data
    }
}

impl DataPoint for LongEncodedDataPoint {
    fn layout(&self) -> &PointLayout {
        &self.layout
    }

    fn get(&self, column: usize) -> NumericValue {
        decode(self.layout.column(column).primitive_type, self.data[column])
    }
}

impl fmt::Debug for LongEncodedDataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LongEncodedDataPoint")
            .field(&self.values())
            .finish()
    }
}

/// Factory producing [`LongEncodedDataPoint`]s for one dimension set.
#[derive(Debug, Clone)]
pub struct LongEncodedDataFactory {
    layout: Arc<PointLayout>,
    parsers: Box<[Arc<dyn NumberParser>]>,
}

impl LongEncodedDataFactory {
    /// Factory bound to `layout`, parsing columns with `parsers`.
    ///
    /// # Panics
    ///
    /// Panics if there is not exactly one parser per column.
    #[must_use]
    pub fn new(layout: Arc<PointLayout>, parsers: Vec<Arc<dyn NumberParser>>) -> Self {
        assert_eq!(
            parsers.len(),
            layout.len(),
            "one parser per column is required"
        );
        Self {
            layout,
            parsers: parsers.into_boxed_slice(),
        }
    }
}

impl DataFactory for LongEncodedDataFactory {
    fn name(&self) -> &'static str {
        "long-encoded"
    }

    fn layout(&self) -> &Arc<PointLayout> {
        &self.layout
    }

    fn parsers(&self) -> &[Arc<dyn NumberParser>] {
        &self.parsers
    }

    fn store(&self, values: Vec<NumericValue>) -> DataPointRef {
        Arc::new(LongEncodedDataPoint::new(Arc::clone(&self.layout), &values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{DimensionDirection, DimensionType};
    use crate::parser::default_parser;
    use crate::storage::ColumnSpec;
    use crate::Error;

    fn factory() -> LongEncodedDataFactory {
        let columns = vec![
            ColumnSpec {
                name: "fes".to_string(),
                primitive_type: PrimitiveType::Long,
                direction: DimensionDirection::IncreasingStrictly,
                dimension_type: DimensionType::IterationFe,
            },
            ColumnSpec {
                name: "f".to_string(),
                primitive_type: PrimitiveType::Float,
                direction: DimensionDirection::Decreasing,
                dimension_type: DimensionType::QualityProblemDependent,
            },
        ];
        LongEncodedDataFactory::new(
            Arc::new(PointLayout::new(columns)),
            vec![
                default_parser(PrimitiveType::Long),
                default_parser(PrimitiveType::Float),
            ],
        )
    }

    #[test]
    fn test_float_uses_low_bits() {
        let encoded = encode(PrimitiveType::Float, NumericValue::Float(-1.5));
        assert_eq!(encoded, i64::from((-1.5f32).to_bits()));
        assert!(encoded >= 0);
    }

    #[test]
    fn test_round_trip_special_doubles() {
        for v in [0.0, -0.0, f64::INFINITY, f64::NEG_INFINITY, f64::MIN_POSITIVE] {
            let back = decode(PrimitiveType::Double, encode(PrimitiveType::Double, v.into()));
            assert_eq!(back.as_double().to_bits(), v.to_bits());
        }
        let nan = decode(
            PrimitiveType::Double,
            encode(PrimitiveType::Double, f64::NAN.into()),
        );
        assert!(nan.as_double().is_nan());
    }

    #[test]
    fn test_round_trip_special_floats() {
        for v in [
            0.0_f32,
            -0.0,
            f32::NAN,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::MIN_POSITIVE / 2.0,
        ] {
            let encoded = encode(PrimitiveType::Float, NumericValue::Float(v));
            match decode(PrimitiveType::Float, encoded) {
                NumericValue::Float(back) => assert_eq!(back.to_bits(), v.to_bits()),
                other => panic!("expected a float, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_string() {
        let point = factory().parse_string("12, 0.25").unwrap();
        assert_eq!(point.get(0), NumericValue::Long(12));
        assert_eq!(point.get(1), NumericValue::Float(0.25));
        assert_eq!(point.get_double(1), 0.25);
        assert_eq!(point.to_string(), "(12, 0.25)");
    }

    #[test]
    fn test_parse_string_wrong_arity() {
        let result = factory().parse_string("1 2 3");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_parse_string_names_bad_token() {
        match factory().parse_string("12 x7") {
            Err(Error::Parse { input, message, .. }) => {
                assert_eq!(input, "x7");
                assert!(message.contains("'f'"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_numbers_checks_fidelity() {
        let factory = factory();
        let point = factory
            .parse_numbers(&[NumericValue::Int(3), NumericValue::Double(0.5)])
            .unwrap();
        assert_eq!(point.get(0), NumericValue::Long(3));
        assert!(factory
            .parse_numbers(&[NumericValue::Double(3.5), NumericValue::Double(0.5)])
            .is_err());
    }

    #[test]
    fn test_compare_respects_direction() {
        let factory = factory();
        let a = factory.parse_string("1 5.0").unwrap();
        let b = factory.parse_string("1 4.0").unwrap();
        // smaller value comes later in a decreasing dimension
        assert_eq!(b.compare_to(a.as_ref()), std::cmp::Ordering::Greater);
        assert!(b.validate_after(a.as_ref()).is_ok());
        assert!(a.validate_after(b.as_ref()).is_err());
        assert!(a.validate_after(a.as_ref()).is_err());
    }
}
