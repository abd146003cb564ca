//! Error types for backing-store operations.

use crate::Value;
use thiserror::Error;

/// Result type alias for backing-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during backing-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required argument was empty or otherwise unusable.
    #[error("invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument.
        argument: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A stored value could not be converted to the requested type.
    #[error("type mismatch at key {key:?}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The property key that was read.
        key: String,
        /// The requested type.
        expected: &'static str,
        /// The kind of value actually stored.
        found: &'static str,
    },
}

impl StoreError {
    /// Create an invalid argument error.
    #[inline]
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(
        key: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        StoreError::TypeMismatch {
            key: key.into(),
            expected,
            found,
        }
    }
}

/// Reject empty keys and subscription ids.
#[inline]
pub(crate) fn require_non_empty(argument: &'static str, value: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::invalid_argument(argument, "must not be empty"));
    }
    Ok(())
}

/// Get the kind name of a stored value.
#[inline]
pub fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Int(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::Model(_) => "model",
        Value::Collection(_) => "collection",
    }
}
