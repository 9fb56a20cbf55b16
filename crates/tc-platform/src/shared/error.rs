//! Platform Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use mongodb::error::{ErrorKind as MongoErrorKind, WriteFailure, RETRYABLE_WRITE_ERROR, TRANSIENT_TRANSACTION_ERROR};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} with {field}={value}")]
    Duplicate { entity_type: String, field: String, value: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Database error: {0}")]
    Database(mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Failure classes callers can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    Forbidden,
    Unauthenticated,
    BadRequest,
    /// Transient; the caller may retry
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PlatformError::NotFound { .. } => ErrorKind::NotFound,
            PlatformError::Duplicate { .. } => ErrorKind::Conflict,
            PlatformError::Validation { .. } => ErrorKind::BadRequest,
            PlatformError::Unauthorized { .. }
            | PlatformError::InvalidCredentials
            | PlatformError::TokenExpired
            | PlatformError::InvalidToken { .. } => ErrorKind::Unauthenticated,
            PlatformError::Forbidden { .. } => ErrorKind::Forbidden,
            PlatformError::Unavailable { .. } => ErrorKind::Unavailable,
            PlatformError::Database(_)
            | PlatformError::Serialization(_)
            | PlatformError::Deserialization(_)
            | PlatformError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Record a failed operation with its identifying key before it is returned
    pub fn log(&self, operation: &'static str, key: &str) {
        let kind = self.kind().as_str();
        match self.kind() {
            ErrorKind::Internal => error!(operation, key, kind, error = %self, "Operation failed"),
            ErrorKind::Unavailable => warn!(operation, key, kind, error = %self, "Operation failed, store unavailable"),
            _ => warn!(operation, key, kind, error = %self, "Operation rejected"),
        }
    }

    /// Classify an error from a write against uniquely indexed fields.
    ///
    /// `keys` lists the unique indexes the write can violate; the one named in
    /// the server message wins, otherwise the first is reported.
    pub fn from_write(err: mongodb::error::Error, entity_type: &str, keys: &[UniqueKey<'_>]) -> Self {
        if let Some(message) = duplicate_key_message(&err) {
            let key = keys
                .iter()
                .find(|k| message.contains(k.index))
                .or_else(|| keys.first());
            return match key {
                Some(k) => Self::duplicate(entity_type, k.field, k.value),
                None => Self::duplicate(entity_type, "unique", message),
            };
        }
        err.into()
    }
}

/// One unique index a write may collide with
#[derive(Debug, Clone, Copy)]
pub struct UniqueKey<'a> {
    pub index: &'a str,
    pub field: &'a str,
    pub value: &'a str,
}

/// Returns the server message when the error is a duplicate key violation.
/// Inserts report it as a write error, findAndModify as a command error.
pub fn duplicate_key_message(error: &mongodb::error::Error) -> Option<&str> {
    match error.kind.as_ref() {
        MongoErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE => {
            Some(write_error.message.as_str())
        }
        MongoErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => {
            Some(command_error.message.as_str())
        }
        _ => None,
    }
}

pub fn is_duplicate_key_error(error: &mongodb::error::Error) -> bool {
    duplicate_key_message(error).is_some()
}

/// Network, pool and server-selection failures, plus anything the driver labels retryable
pub fn is_transient(error: &mongodb::error::Error) -> bool {
    if error.contains_label(RETRYABLE_WRITE_ERROR) || error.contains_label(TRANSIENT_TRANSACTION_ERROR) {
        return true;
    }
    matches!(
        error.kind.as_ref(),
        MongoErrorKind::Io(_)
            | MongoErrorKind::ServerSelection { .. }
            | MongoErrorKind::ConnectionPoolCleared { .. }
    )
}

impl From<mongodb::error::Error> for PlatformError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_transient(&err) {
            PlatformError::Unavailable { message: err.to_string() }
        } else {
            PlatformError::Database(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub http_status_equivalent: u16,
    pub error: String,
    pub message: String,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status();

        // Store internals stay in the logs
        let message = match &self {
            PlatformError::Database(_)
            | PlatformError::Serialization(_)
            | PlatformError::Deserialization(_) => "Internal error".to_string(),
            PlatformError::Unavailable { .. } => "Service temporarily unavailable, retry later".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            http_status_equivalent: status.as_u16(),
            error: kind.as_str().to_ascii_uppercase(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PlatformError::duplicate("User", "email", "a@x.com").kind().status(), StatusCode::CONFLICT);
        assert_eq!(PlatformError::not_found("User", "1").kind().status(), StatusCode::NOT_FOUND);
        assert_eq!(PlatformError::forbidden("no").kind().status(), StatusCode::FORBIDDEN);
        assert_eq!(PlatformError::InvalidCredentials.kind().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(PlatformError::TokenExpired.kind().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(PlatformError::validation("bad").kind().status(), StatusCode::BAD_REQUEST);
        assert_eq!(PlatformError::unavailable("down").kind().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(PlatformError::internal("boom").kind().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = PlatformError::duplicate("Follow", "parent_user_id,follower_id", "a/b").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = PlatformError::unavailable("timed out").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_io_error_is_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = mongodb::error::Error::from(io);
        assert!(is_transient(&err));
        assert!(!is_duplicate_key_error(&err));
        assert_eq!(PlatformError::from(err).kind(), ErrorKind::Unavailable);
    }
}
