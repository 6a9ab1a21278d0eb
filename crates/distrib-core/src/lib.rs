//! Core types for binned numeric distributions
//!
//! This crate holds the pieces every distribution shares regardless of how
//! it bins: the unified [`Error`] type, untyped [`RawValue`] input tagged
//! with its [`ValueSource`], and the [`ElementStrategy`] trait that gives a
//! distribution its element type.
//!
//! # Example
//!
//! ```rust
//! use distrib_core::{ElementStrategy, Error, IntegerStrategy, RawValue, ValueSource};
//!
//! let strategy = IntegerStrategy;
//! assert_eq!(strategy.coerce("age", &RawValue::from("42"), ValueSource::Config).unwrap(), 42);
//! assert_eq!(strategy.coerce("age", &RawValue::from(42.0), ValueSource::Db).unwrap(), 42);
//!
//! let err = strategy.coerce("age", &RawValue::from("abc"), ValueSource::Db).unwrap_err();
//! assert!(matches!(err, Error::DataType { .. }));
//! ```

pub mod error;
pub mod strategy;
pub mod value;

// Re-export core types
pub use error::{Error, Result};
pub use strategy::{ElementStrategy, FloatStrategy, IntegerStrategy, NumericElement, ValueType};
pub use value::{coercion_error_kind, CoercionErrorKind, RawValue, ValueSource};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
