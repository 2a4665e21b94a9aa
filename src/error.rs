//! Error types for Elidune circulation

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Numeric error codes carried in every error response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NoSuchItem = 5,
    BadValue = 18,
    NoSuchAccount = 22,
    CatalogBusy = 23,
    NotBorrowedByCaller = 24,
    WaitTimeout = 25,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Account not found: {0}")]
    AccountNotFound(u64),

    /// The catalog lock could not be taken without waiting
    #[error("Catalog busy: {0}")]
    Busy(String),

    #[error("Not borrowed by caller: {0}")]
    NotBorrowedByCaller(String),

    #[error("Timed out waiting for stock: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchItem,
            AppError::AccountNotFound(_) => ErrorCode::NoSuchAccount,
            AppError::Busy(_) => ErrorCode::CatalogBusy,
            AppError::NotBorrowedByCaller(_) => ErrorCode::NotBorrowedByCaller,
            AppError::Timeout(_) => ErrorCode::WaitTimeout,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::BadValue,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
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
        let code = self.code();
        let (status, message) = match &self {
            AppError::NotFound(_) | AppError::AccountNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Busy(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::NotBorrowedByCaller(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, self.to_string()),
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
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
