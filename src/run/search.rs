//! Typed binary search over one column of a run

use std::cmp::Ordering;

use crate::storage::{DataPointRef, NumericValue};

/// Native value type of a column. Integers use their natural order, floats
/// their total order so that NaN and signed zeros have a fixed place.
pub(super) trait ColumnType: Copy {
    fn from_value(value: NumericValue) -> Self;
    fn order(self, other: Self) -> Ordering;
}

macro_rules! integer_column {
    ($($ty:ty),*) => {
        $(impl ColumnType for $ty {
            #[allow(clippy::cast_possible_truncation)]
            fn from_value(value: NumericValue) -> Self {
                value.as_long() as Self
            }

            fn order(self, other: Self) -> Ordering {
                self.cmp(&other)
            }
        })*
    };
}

integer_column!(i8, i16, i32, i64);

impl ColumnType for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: NumericValue) -> Self {
        match value {
            NumericValue::Float(v) => v,
            other => other.as_double() as Self,
        }
    }

    fn order(self, other: Self) -> Ordering {
        self.total_cmp(&other)
    }
}

impl ColumnType for f64 {
    fn from_value(value: NumericValue) -> Self {
        value.as_double()
    }

    fn order(self, other: Self) -> Ordering {
        self.total_cmp(&other)
    }
}

/// How a column is searched.
#[derive(Debug, Clone, Copy)]
pub(super) struct Policy {
    pub increasing: bool,
    pub strict: bool,
    pub optimistic: bool,
}

/// Index of the point matching `key` in `column`, or `None`.
///
/// An exact hit is returned directly for strict columns; otherwise the search
/// walks back to the earliest point holding `key`. Without a hit, optimistic
/// columns answer with the first point past `key`, conservative columns with
/// the last point before it.
pub(super) fn find_index<T: ColumnType>(
    points: &[DataPointRef],
    column: usize,
    key: T,
    policy: Policy,
) -> Option<usize> {
    let value_at = |index: usize| T::from_value(points[index].get(column));

    // `high` is exclusive; the midpoint is taken over the inclusive range
    let (mut low, mut high) = (0, points.len());
    while low < high {
        let mid = low + (high - low - 1) / 2;
        match value_at(mid).order(key) {
            Ordering::Equal => {
                if policy.strict {
                    return Some(mid);
                }
                let mut first = mid;
                while first > 0 && value_at(first - 1).order(key) == Ordering::Equal {
                    first -= 1;
                }
                return Some(first);
            }
            c if (c == Ordering::Less) == policy.increasing => low = mid + 1,
            _ => high = mid,
        }
    }

    if policy.optimistic {
        (low < points.len()).then_some(low)
    } else {
        low.checked_sub(1)
    }
}
