//! Error types for serialization operations.

use backing_store::StoreError;
use thiserror::Error;

/// Result type alias for serialization operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while writing or parsing models.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The underlying store rejected an operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// No factory is registered for the content type.
    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType {
        /// The requested content type.
        content_type: String,
    },

    /// An object was found where no nested model factory is known.
    #[error("no model factory for object at property {property:?}")]
    UnmappedObject {
        /// The property holding the object.
        property: String,
    },

    /// A node had a different shape than the caller asked for.
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        /// The requested shape.
        expected: &'static str,
        /// The shape actually present.
        found: &'static str,
    },

    /// A value cannot be represented in the target format.
    #[error("invalid value: {message}")]
    InvalidValue {
        /// Description of what went wrong.
        message: String,
    },

    /// The writer was used out of order.
    #[error("invalid writer state: {message}")]
    InvalidState {
        /// Description of what went wrong.
        message: String,
    },
}

impl CodecError {
    /// Create an unsupported content type error.
    #[inline]
    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        CodecError::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Create an invalid value error.
    #[inline]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        CodecError::InvalidValue {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    #[inline]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CodecError::InvalidState {
            message: message.into(),
        }
    }
}
