//! Shared Error Types
//!
//! Error types that describe bad input independently of HTTP. The backend
//! converts them into responses; API clients can use them to decode the
//! `errors` list of a rejected request.
//!
//! # Error Categories
//!
//! - `ValidationError` - A single request field failed validation
//! - `InvalidValue` - A string could not be parsed into one of the model enums
//!
//! # Usage
//!
//! ```rust
//! use devtracker::shared::error::SharedError;
//!
//! let error = SharedError::validation("name", "Please provide a project name.");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared error types
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Unknown value for an enumerated field
    #[error("'{value}' is not a valid {kind}")]
    InvalidValue {
        /// What was being parsed (e.g. "ticket status")
        kind: &'static str,
        /// The rejected input
        value: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid value error
    pub fn invalid_value(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind,
            value: value.into(),
        }
    }
}

/// One entry of a validation failure response
///
/// Serialized as `{ "param": "name", "msg": "Please provide a project name." }`,
/// one per offending field, in the order the checks ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the request field
    pub param: String,
    /// Message shown to the user
    pub msg: String,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            msg: msg.into(),
        }
    }
}

impl From<SharedError> for FieldError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { field, message } => FieldError::new(field, message),
            other => FieldError::new("body", other.to_string()),
        }
    }
}
