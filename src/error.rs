//! Error types for Lendery server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    BadValue = 6,
    Duplicate = 7,
    AlreadyBorrowed = 8,
    OutOfStock = 9,
    NoActiveBorrow = 10,
    InvalidState = 11,
    Busy = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Book already borrowed: {0}")]
    AlreadyBorrowed(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("No active borrow: {0}")]
    NoActiveBorrow(String),

    #[error("Invariant violation: {0}")]
    InvalidState(String),

    #[error("Resource busy: {0}")]
    Busy(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// A failed operation can be retried without side effects only if it
    /// rolled back cleanly and the cause was lock contention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Busy(_))
    }
}

/// Postgres SQLSTATE codes the lending paths translate into domain errors.
const PG_LOCK_NOT_AVAILABLE: &str = "55P03";
const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_CHECK_VIOLATION: &str = "23514";

/// Map a sqlx error from a lock-acquiring statement. A lock_timeout expiry
/// surfaces as `Busy` so the caller can retry with backoff.
pub fn map_lock_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(PG_LOCK_NOT_AVAILABLE) {
            return AppError::Busy("Book is locked by another operation".to_string());
        }
    }
    AppError::Database(err)
}

/// Map a sqlx error from the ledger insert. The partial unique index on open
/// records turns a lost race into a unique violation rather than a double
/// borrow.
pub fn map_insert_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
            return AppError::AlreadyBorrowed(
                "You have already borrowed this book and not returned it yet".to_string(),
            );
        }
    }
    AppError::Database(err)
}

/// Map a sqlx error from an inventory adjustment. The CHECK constraint on
/// available_copies is the storage-level backstop for the engine's own bound
/// check; tripping it means the invariant was about to be violated.
pub fn map_adjust_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(PG_CHECK_VIOLATION) {
            return AppError::InvalidState(
                "available_copies adjustment rejected by constraint".to_string(),
            );
        }
    }
    AppError::Database(err)
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::InvalidArgument(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::AlreadyBorrowed(msg) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyBorrowed, msg.clone())
            }
            AppError::OutOfStock(msg) => {
                (StatusCode::CONFLICT, ErrorCode::OutOfStock, msg.clone())
            }
            AppError::NoActiveBorrow(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoActiveBorrow, msg.clone())
            }
            AppError::InvalidState(msg) => {
                tracing::error!("Data integrity violation: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InvalidState,
                    "Data integrity violation".to_string(),
                )
            }
            AppError::Busy(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::Busy, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_is_the_only_retryable_kind() {
        assert!(AppError::Busy("contention".into()).is_retryable());
        assert!(!AppError::OutOfStock("none left".into()).is_retryable());
        assert!(!AppError::Database(sqlx::Error::RowNotFound).is_retryable());
    }

    #[test]
    fn non_database_errors_pass_through_lock_mapping() {
        let err = map_lock_err(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
