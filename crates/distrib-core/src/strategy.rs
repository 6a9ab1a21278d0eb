//! Element strategies: typed coercion and summation
//!
//! A distribution is generic over the numeric element it bins. Everything
//! that depends on the concrete element type lives behind
//! [`ElementStrategy`]: turning a [`RawValue`] into an element, folding
//! `value * count` into a running sum, and projecting sums onto `f64` for
//! summary statistics. Elements themselves implement [`NumericElement`], so
//! bin edges and bin placement stay in the element type and integer bins
//! are exact over the whole `i64` range.
//!
//! # Overflow
//!
//! [`IntegerStrategy`] accumulates into an `i128`. A single `value * count`
//! product always fits; the running sum saturates at the `i128` bounds
//! rather than wrapping.

use crate::value::{coercion_error_kind, RawValue, ValueSource};
use crate::Result;
use num_traits::{Num, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Logical type of the values being distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Whole numbers (64-bit signed)
    #[default]
    Integer,
    /// Real numbers (64-bit float)
    Number,
}

impl ValueType {
    /// Expected-type wording used in coercion errors
    pub fn expected(self) -> &'static str {
        match self {
            Self::Integer => "an integer",
            Self::Number => "a number",
        }
    }
}

/// Arithmetic a bin layout needs from an element type
pub trait NumericElement: Copy + PartialOrd + Debug + Display + Zero {
    /// Whether the value is a point on the real line
    fn is_finite(self) -> bool;

    /// Position on the real line, rounded for integers beyond 2^53
    fn as_f64(self) -> f64;

    /// `self + width * steps`, or `None` when it is not representable
    fn offset(self, width: Self, steps: usize) -> Option<Self>;

    /// Number of `width`-wide steps needed to reach `end` from `self`
    fn steps_to(self, end: Self, width: Self) -> Option<usize>;
}

impl NumericElement for i64 {
    fn is_finite(self) -> bool {
        true
    }

    fn as_f64(self) -> f64 {
        self as f64
    }

    fn offset(self, width: i64, steps: usize) -> Option<i64> {
        let steps = i64::try_from(steps).ok()?;
        width.checked_mul(steps).and_then(|delta| self.checked_add(delta))
    }

    fn steps_to(self, end: i64, width: i64) -> Option<usize> {
        let span = i128::from(end) - i128::from(self);
        let width = i128::from(width);
        if span < 0 || width <= 0 {
            return None;
        }
        usize::try_from((span + width - 1) / width).ok()
    }
}

impl NumericElement for f64 {
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    fn as_f64(self) -> f64 {
        self
    }

    fn offset(self, width: f64, steps: usize) -> Option<f64> {
        Some(self + steps as f64 * width)
    }

    fn steps_to(self, end: f64, width: f64) -> Option<usize> {
        let steps = ((end - self) / width).ceil();
        // `as` saturates, callers compare against a bin limit
        (steps.is_finite() && steps >= 0.0).then(|| steps as usize)
    }
}

/// Type-specific behaviour of a distribution's element type
pub trait ElementStrategy: Clone + Debug {
    /// Element type values are coerced into
    type Element: NumericElement;
    /// Accumulator type for `value * count` sums
    type Sum: Copy + PartialEq + Debug;

    /// Logical value type this strategy handles
    fn value_type(&self) -> ValueType;

    /// Convert a raw value into an element
    ///
    /// Failures produce the error kind selected by
    /// [`coercion_error_kind`] for `source`, naming `object_name`.
    fn coerce(&self, object_name: &str, raw: &RawValue, source: ValueSource) -> Result<Self::Element>;

    /// Empty sum
    fn zero(&self) -> Self::Sum;

    /// `sum + value * count`
    fn weighted_add(&self, sum: Self::Sum, value: Self::Element, count: u64) -> Self::Sum;

    /// Combine two partial sums
    fn combine(&self, a: Self::Sum, b: Self::Sum) -> Self::Sum;

    /// Sum as a float, for derived statistics
    fn sum_to_f64(&self, sum: Self::Sum) -> f64;

    /// Build the coercion failure for `object_name` from `source`
    fn coercion_error(&self, object_name: &str, source: ValueSource) -> crate::Error {
        coercion_error_kind(source).into_error(object_name, self.value_type().expected())
    }
}

/// Strategy for 64-bit signed integer distributions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerStrategy;

impl ElementStrategy for IntegerStrategy {
    type Element = i64;
    type Sum = i128;

    fn value_type(&self) -> ValueType {
        ValueType::Integer
    }

    fn coerce(&self, object_name: &str, raw: &RawValue, source: ValueSource) -> Result<i64> {
        match raw {
            RawValue::Int(i) => Ok(*i),
            RawValue::UInt(u) => Ok(i64::try_from(*u).unwrap_or(i64::MAX)),
            // Truncates toward zero, saturates at the i64 bounds, NaN -> 0
            RawValue::Float(x) => Ok(*x as i64),
            RawValue::Text(s) => <i64 as Num>::from_str_radix(s, 10)
                .map_err(|_| self.coercion_error(object_name, source)),
            RawValue::Null | RawValue::Bool(_) | RawValue::Composite(_) => {
                Err(self.coercion_error(object_name, source))
            }
        }
    }

    fn zero(&self) -> i128 {
        0
    }

    fn weighted_add(&self, sum: i128, value: i64, count: u64) -> i128 {
        // |i64| * u64 < 2^127, so the product itself cannot overflow
        sum.saturating_add(i128::from(value) * i128::from(count))
    }

    fn combine(&self, a: i128, b: i128) -> i128 {
        a.saturating_add(b)
    }

    fn sum_to_f64(&self, sum: i128) -> f64 {
        sum.to_f64().unwrap_or(f64::NAN)
    }
}

/// Strategy for 64-bit float distributions
///
/// Non-finite values are rejected: they cannot be placed in a bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatStrategy;

impl ElementStrategy for FloatStrategy {
    type Element = f64;
    type Sum = f64;

    fn value_type(&self) -> ValueType {
        ValueType::Number
    }

    fn coerce(&self, object_name: &str, raw: &RawValue, source: ValueSource) -> Result<f64> {
        let value = match raw {
            RawValue::Int(i) => *i as f64,
            RawValue::UInt(u) => *u as f64,
            RawValue::Float(x) => *x,
            RawValue::Text(s) => s
                .parse::<f64>()
                .map_err(|_| self.coercion_error(object_name, source))?,
            RawValue::Null | RawValue::Bool(_) | RawValue::Composite(_) => {
                return Err(self.coercion_error(object_name, source));
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.coercion_error(object_name, source))
        }
    }

    fn zero(&self) -> f64 {
        0.0
    }

    fn weighted_add(&self, sum: f64, value: f64, count: u64) -> f64 {
        sum + value * count as f64
    }

    fn combine(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn sum_to_f64(&self, sum: f64) -> f64 {
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use proptest::prelude::*;

    #[test]
    fn test_integer_coerce_text() {
        let s = IntegerStrategy;
        assert_eq!(s.coerce("x", &RawValue::from("42"), ValueSource::Config).unwrap(), 42);
        assert_eq!(s.coerce("x", &RawValue::from("-17"), ValueSource::Db).unwrap(), -17);
        assert_eq!(s.coerce("x", &RawValue::from("+8"), ValueSource::Db).unwrap(), 8);
    }

    #[test]
    fn test_integer_coerce_numeric_never_fails() {
        let s = IntegerStrategy;
        assert_eq!(s.coerce("c", &RawValue::Float(42.0), ValueSource::Db).unwrap(), 42);
        assert_eq!(s.coerce("c", &RawValue::Float(42.9), ValueSource::Db).unwrap(), 42);
        assert_eq!(s.coerce("c", &RawValue::Float(-2.7), ValueSource::Db).unwrap(), -2);
        assert_eq!(s.coerce("c", &RawValue::Float(f64::NAN), ValueSource::Db).unwrap(), 0);
        assert_eq!(s.coerce("c", &RawValue::Float(1e300), ValueSource::Db).unwrap(), i64::MAX);
        assert_eq!(s.coerce("c", &RawValue::UInt(u64::MAX), ValueSource::Db).unwrap(), i64::MAX);
        assert_eq!(s.coerce("c", &RawValue::Int(i64::MIN), ValueSource::Db).unwrap(), i64::MIN);
    }

    #[test]
    fn test_integer_coerce_failures_depend_on_source() {
        let s = IntegerStrategy;

        let err = s.coerce("range_min", &RawValue::from("abc"), ValueSource::Config).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { ref field, .. } if field == "range_min"));
        assert_eq!(err.to_string(), "range_min must be an integer value.");

        let err = s.coerce("age", &RawValue::from("abc"), ValueSource::Db).unwrap_err();
        assert!(matches!(err, Error::DataType { ref column, .. } if column == "age"));
        assert_eq!(err.to_string(), "Value in column age is not an integer.");

        let err = s.coerce("tmp", &RawValue::from("abc"), ValueSource::Derived).unwrap_err();
        assert!(matches!(err, Error::Coercion { .. }));
    }

    #[test]
    fn test_integer_rejects_non_numeric_non_text() {
        let s = IntegerStrategy;
        assert!(s.coerce("c", &RawValue::Null, ValueSource::Db).is_err());
        assert!(s.coerce("c", &RawValue::Bool(true), ValueSource::Db).is_err());
        assert!(s.coerce("c", &RawValue::from("4.5"), ValueSource::Db).is_err());
        assert!(s.coerce("c", &RawValue::from(" 4"), ValueSource::Db).is_err());
        assert!(s.coerce("c", &RawValue::from(""), ValueSource::Db).is_err());
    }

    #[test]
    fn test_integer_sum_saturates() {
        let s = IntegerStrategy;
        let big = s.weighted_add(s.zero(), i64::MAX, u64::MAX);
        assert_eq!(big, i128::from(i64::MAX) * i128::from(u64::MAX));
        let saturated = s.weighted_add(big, i64::MAX, u64::MAX);
        assert_eq!(saturated, i128::MAX);
        assert_eq!(s.combine(i128::MIN, -1), i128::MIN);
    }

    #[test]
    fn test_float_coerce() {
        let s = FloatStrategy;
        assert_eq!(s.coerce("c", &RawValue::from("2.5"), ValueSource::Db).unwrap(), 2.5);
        assert_eq!(s.coerce("c", &RawValue::Int(3), ValueSource::Db).unwrap(), 3.0);
        let err = s.coerce("c", &RawValue::from("NaN"), ValueSource::Db).unwrap_err();
        assert_eq!(err.to_string(), "Value in column c is not a number.");
        assert!(s.coerce("c", &RawValue::Float(f64::INFINITY), ValueSource::Db).is_err());
    }

    #[test]
    fn test_integer_element_steps_are_exact() {
        const TWO_53: i64 = 1 << 53;
        assert_eq!(TWO_53.offset(1, 3), Some(TWO_53 + 3));
        assert_eq!(0i64.steps_to(10, 4), Some(3));
        assert_eq!(0i64.steps_to(12, 4), Some(3));
        assert_eq!(i64::MIN.steps_to(i64::MAX, 1), usize::try_from(u64::MAX).ok());
        assert_eq!(i64::MAX.offset(1, 1), None);
    }

    #[test]
    fn test_float_element_steps() {
        assert_eq!(0.0f64.steps_to(10.0, 4.0), Some(3));
        assert_eq!((-1e308f64).steps_to(1e308, 1.0), None);
        assert!(!f64::NAN.is_finite());
        assert_eq!(1.5f64.offset(0.5, 3), Some(3.0));
    }

    proptest! {
        #[test]
        fn prop_integer_text_coercion_roundtrips(v in any::<i64>()) {
            let s = IntegerStrategy;
            let raw = RawValue::Text(v.to_string());
            prop_assert_eq!(s.coerce("c", &raw, ValueSource::Db).unwrap(), v);
        }

        #[test]
        fn prop_coercion_is_deterministic(text in "\\PC{0,12}") {
            let s = IntegerStrategy;
            let raw = RawValue::Text(text);
            let a = s.coerce("c", &raw, ValueSource::Db).ok();
            let b = s.coerce("c", &raw, ValueSource::Db).ok();
            prop_assert_eq!(a, b);
        }
    }
}
