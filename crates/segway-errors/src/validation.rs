//! Configuration and input validation errors.
//!
//! Degenerate constants (zero wheel diameter, negative period, NaN gains)
//! are caught here at startup so the loop never sees a non-finite value
//! produced by its own configuration.

use core::fmt;

use crate::common::ErrorSeverity;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value must be strictly positive
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive {
        /// Field name
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Value is NaN or infinite
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// Field name
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Value is required but missing
    #[error("Required field '{0}' is missing")]
    Required(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Unsupported schema version
    #[error("Unsupported schema version '{found}', expected '{expected}'")]
    SchemaVersion {
        /// Version found in the document
        found: String,
        /// Version this build understands
        expected: String,
    },
}

impl ValidationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a not-positive error.
    pub fn not_positive(field: impl Into<String>, value: f64) -> Self {
        ValidationError::NotPositive {
            field: field.into(),
            value,
        }
    }

    /// Create a non-finite error.
    pub fn non_finite(field: impl Into<String>, value: f64) -> Self {
        ValidationError::NonFinite {
            field: field.into(),
            value,
        }
    }

    /// Create a required field error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required(field.into())
    }

    /// Create a constraint violation error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        ValidationError::ConstraintViolation(msg.into())
    }

    /// Name of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::NotPositive { field, .. }
            | ValidationError::NonFinite { field, .. } => Some(field),
            ValidationError::Required(field) => Some(field),
            ValidationError::ConstraintViolation(_) | ValidationError::SchemaVersion { .. } => {
                None
            }
        }
    }
}
