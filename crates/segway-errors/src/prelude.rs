//! Prelude module for convenient error handling imports.

pub use crate::{
    RTResult, Result,
    common::{ErrorCategory, ErrorSeverity, SegwayError},
    device::DeviceError,
    rt::RTError,
    validation::ValidationError,
};

/// Return early with a validation error unless `$condition` holds.
#[macro_export]
macro_rules! ensure_valid {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($error.into());
        }
    };
}

/// Return early unless `$value` is finite and strictly positive.
#[macro_export]
macro_rules! ensure_positive {
    ($field:expr, $value:expr) => {
        if !$value.is_finite() {
            return Err($crate::ValidationError::non_finite($field, $value).into());
        }
        if $value <= 0.0 {
            return Err($crate::ValidationError::not_positive($field, $value).into());
        }
    };
}
