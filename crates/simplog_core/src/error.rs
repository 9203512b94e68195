//! Error types for simplog core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while decoding queries or converting records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A query argument's value could not be converted to its declared type.
    #[error("invalid value {value:?} for query argument {key:?}: {reason}")]
    InvalidQueryValue {
        /// The raw query key, including any type suffix.
        key: String,
        /// The raw query value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A JSON value that should have been an object was something else.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON type name of the offending value.
        found: &'static str,
    },

    /// A value has no direct representation in JSON.
    #[error("{kind} value has no JSON representation")]
    NotWireNative {
        /// Name of the value kind.
        kind: &'static str,
    },

    /// A record identifier could not be parsed from text.
    #[error("invalid record id: {0:?}")]
    InvalidRecordId(String),
}

impl CoreError {
    /// Create an invalid query value error.
    pub fn invalid_query_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidQueryValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error was caused by client input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidQueryValue { .. }
                | CoreError::NotAnObject { .. }
                | CoreError::InvalidRecordId(_)
        )
    }
}
