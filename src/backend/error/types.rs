/**
 * Backend Error Types
 *
 * This module defines the error type returned by every handler.
 *
 * # Error Categories
 *
 * ## Client errors
 *
 * - `ValidationError` - One or more request fields are missing or malformed
 * - `HandlerError` - Any other rejected request (duplicate name, bad reference)
 * - `Unauthorized` - Missing/invalid token, or the caller may not do this
 * - `NotFound` - A referenced document does not exist
 *
 * ## Server errors
 *
 * Database, hashing, token encoding and serialization failures. Their
 * details are logged, never returned: the client only sees "Server Error".
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::{FieldError, SharedError};

/// Message returned for every 500
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// Message returned when an action is denied
pub const NOT_PERMITTED_MESSAGE: &str = "You are not permitted to perform this action.";

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use devtracker::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "A project with that name already exists.");
/// let err = BackendError::not_found("Ticket not found");
/// let err = BackendError::not_permitted();
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request fields failed validation
    #[error("Validation failed: {errors:?}")]
    ValidationError {
        /// 400 or 422 depending on the route
        status: StatusCode,
        /// One entry per offending field
        errors: Vec<FieldError>,
    },

    /// Handler error (e.g., duplicate name, invalid reference)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Missing credentials or a denied action
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Referenced document does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Shared error (from the shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Migration error at startup
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// JWT encoding/decoding error
    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    /// Password hashing error
    #[error("Password hashing error: {0}")]
    PasswordHashError(#[from] bcrypt::BcryptError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// 400 with a single message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// 409 with a single message
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::CONFLICT, message)
    }

    /// Validation failure with the given status
    pub fn validation(status: StatusCode, errors: Vec<FieldError>) -> Self {
        Self::ValidationError { status, errors }
    }

    /// 401 with a message
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// 401 for an authenticated caller lacking the rights for an action
    pub fn not_permitted() -> Self {
        Self::unauthorized(NOT_PERMITTED_MESSAGE)
    }

    /// 404 with a message
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `ValidationError` / `HandlerError` - Status carried by the error
    /// - `Unauthorized` - 401
    /// - `NotFound` - 404
    /// - `SharedError` - 400
    /// - Everything else - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { status, .. } => *status,
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            },
            Self::DatabaseError(_)
            | Self::MigrationError(_)
            | Self::TokenError(_)
            | Self::PasswordHashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the message shown to the client
    ///
    /// Server errors collapse to [`SERVER_ERROR_MESSAGE`].
    pub fn message(&self) -> String {
        if self.status_code().is_server_error() {
            return SERVER_ERROR_MESSAGE.to_string();
        }
        match self {
            Self::ValidationError { errors, .. } => errors
                .first()
                .map(|e| e.msg.clone())
                .unwrap_or_else(|| "Invalid request".to_string()),
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unauthorized { message } => message.clone(),
            Self::NotFound { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            other => other.to_string(),
        }
    }

    /// Field errors to render, if this is a validation-style failure
    pub fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            Self::ValidationError { errors, .. } => Some(errors.clone()),
            Self::SharedError(err @ SharedError::ValidationError { .. }) => {
                Some(vec![err.clone().into()])
            }
            _ => None,
        }
    }

    /// True when a database write hit a UNIQUE constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::DatabaseError(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
