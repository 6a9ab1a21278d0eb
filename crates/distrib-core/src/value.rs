//! Untyped input values and where they come from
//!
//! Stream providers hand the engine [`RawValue`]s tagged with a
//! [`ValueSource`]. The source decides which error a failed coercion turns
//! into: a user-facing argument error for configuration input, a data-type
//! error for values read from the backing store.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Supplied by the user as configuration
    Config,
    /// Read from the backing data store
    #[default]
    Db,
    /// Produced by an intermediate computation
    Derived,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::Db => "db",
            Self::Derived => "derived",
        };
        f.write_str(name)
    }
}

/// Kind of error a failed coercion produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoercionErrorKind {
    /// User-facing invalid argument naming the field
    InvalidArgument,
    /// Internal error naming the offending column
    DataType,
    /// Generic failure for any other source
    Unclassified,
}

impl CoercionErrorKind {
    /// Build the error for a value of `object_name` that is not `expected`
    ///
    /// `expected` is phrased with its article, e.g. `"an integer"`.
    pub fn into_error(self, object_name: &str, expected: &str) -> Error {
        match self {
            Self::InvalidArgument => Error::InvalidArgument {
                field: object_name.to_string(),
                expected: expected.to_string(),
            },
            Self::DataType => Error::DataType {
                column: object_name.to_string(),
                expected: expected.to_string(),
            },
            Self::Unclassified => Error::Coercion {
                name: object_name.to_string(),
                expected: expected.to_string(),
            },
        }
    }
}

/// Map a value source to the error kind its coercion failures produce
pub fn coercion_error_kind(source: ValueSource) -> CoercionErrorKind {
    match source {
        ValueSource::Config => CoercionErrorKind::InvalidArgument,
        ValueSource::Db => CoercionErrorKind::DataType,
        ValueSource::Derived => CoercionErrorKind::Unclassified,
    }
}

/// An untyped value as delivered by a stream provider
///
/// Deserializes from any JSON value: `null`, booleans, numbers and strings
/// map to their variants, arrays and objects to [`RawValue::Composite`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Composite(serde_json::Value),
}

impl RawValue {
    /// Short type name, used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Composite(_) => "composite",
        }
    }

    /// Whether the value is already numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::UInt(_) | Self::Float(_))
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Composite(v) => write!(f, "{v}"),
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    // serde_json numbers are always representable as f64
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::Text(s),
            other => Self::Composite(other),
        }
    }
}

impl From<RawValue> for serde_json::Value {
    fn from(value: RawValue) -> Self {
        use serde_json::Value;
        match value {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Int(i) => Value::from(i),
            RawValue::UInt(u) => Value::from(u),
            RawValue::Float(x) => serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number),
            RawValue::Text(s) => Value::String(s),
            RawValue::Composite(v) => v,
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for RawValue {
            fn from(value: $t) -> Self {
                Self::Int(i64::from(value))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for RawValue {
            fn from(value: $t) -> Self {
                Self::UInt(u64::from(value))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<f32> for RawValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
