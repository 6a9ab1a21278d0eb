//! Error types for binned distribution analysis
//!
//! Provides a unified error type for all distrib-stats crates.

use thiserror::Error;

/// Core error type for distribution operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed bin or value specification
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A configuration-supplied value could not be coerced
    #[error("{field} must be {expected} value.")]
    InvalidArgument { field: String, expected: String },

    /// A value read from the backing data source has the wrong type
    #[error("Value in column {column} is not {expected}.")]
    DataType { column: String, expected: String },

    /// A derived value could not be coerced
    #[error("Could not convert value of {name} to {expected}")]
    Coercion { name: String, expected: String },

    /// The stream provider failed mid-stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// Operation invoked out of order
    #[error("Invalid state: {0}")]
    State(String),

    /// IO error (for stream providers backed by readers)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for an invalid specification parameter
    pub fn invalid_spec(context: &str, reason: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("{context}: {reason}"))
    }

    /// Create an error for NaN/Inf configuration values
    pub fn non_finite(context: &str) -> Self {
        Self::Configuration(format!("{context} must be a finite number"))
    }

    /// Create an error for an operation called in the wrong state
    pub fn out_of_order(operation: &str, state: impl std::fmt::Debug) -> Self {
        Self::State(format!("cannot {operation} while {state:?}"))
    }

    /// Whether this error describes a single bad data record
    ///
    /// Such records are tallied as missing cases instead of aborting the
    /// whole computation.
    pub fn is_recoverable_data_error(&self) -> bool {
        matches!(self, Self::DataType { .. } | Self::Coercion { .. })
    }
}
