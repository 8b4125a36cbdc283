//! Error types for targeting and variant allocation

use thiserror::Error;

/// Result type for targeting operations
pub type TargetingResult<T> = Result<T, TargetingError>;

/// Targeting errors
#[derive(Debug, Error)]
pub enum TargetingError {
    /// A percentage or percentile bound lies outside `[0, 100]`
    #[error("The value of '{field}' is out of the accepted range: {value}")]
    OutOfRange {
        /// Path of the offending field
        field: String,
        /// Offending value
        value: f64,
    },

    /// A percentile allocation whose lower bound exceeds its upper bound
    #[error("Invalid percentile range in '{field}': from {from} is greater than to {to}")]
    InvalidPercentile {
        /// Path of the offending entry
        field: String,
        /// Lower bound
        from: f64,
        /// Upper bound
        to: f64,
    },

    /// The targeting context provider failed
    #[error("Failed to resolve targeting context: {0}")]
    Context(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Feature definitions could not be parsed
    #[error("Failed to parse feature definitions: {0}")]
    Parse(String),
}

impl TargetingError {
    /// Create an out-of-range error
    pub fn out_of_range(field: impl Into<String>, value: f64) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value,
        }
    }

    /// Create an invalid percentile error
    pub fn invalid_percentile(field: impl Into<String>, from: f64, to: f64) -> Self {
        Self::InvalidPercentile {
            field: field.into(),
            from,
            to,
        }
    }

    /// Wrap a context provider failure
    pub fn context<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Context(err.into())
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Check if this error came from configuration validation
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::InvalidPercentile { .. })
    }

    /// Path of the offending field, for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::OutOfRange { field, .. } | Self::InvalidPercentile { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Check that a percentage lies within `[0, 100]`.
///
/// NaN is rejected along with out-of-range values.
pub(crate) fn ensure_percentage(value: f64, field: impl FnOnce() -> String) -> TargetingResult<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(TargetingError::out_of_range(field(), value))
    }
}
