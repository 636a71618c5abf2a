//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::LedgerError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("Document number already registered")]
    DocumentNumberTaken,

    // Ledger errors - map to appropriate HTTP status
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, "missing_header", Some(header.clone()))
            }

            // 409 Conflict
            AppError::DocumentNumberTaken => {
                (StatusCode::CONFLICT, "document_number_taken", None)
            }

            AppError::Ledger(ref ledger_err) => match ledger_err {
                LedgerError::AccountNotFound(id) => {
                    (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
                }
                LedgerError::InvalidOperationType(id) => (
                    StatusCode::BAD_REQUEST,
                    "invalid_operation_type",
                    Some(id.to_string()),
                ),
                LedgerError::LimitExceeded { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "limit_exceeded",
                    Some(ledger_err.to_string()),
                ),
                LedgerError::EmptyIdempotencyKey => {
                    (StatusCode::BAD_REQUEST, "empty_idempotency_key", None)
                }
                LedgerError::BalanceContention => {
                    (StatusCode::CONFLICT, "balance_contention", None)
                }
                LedgerError::Store(e) => {
                    tracing::error!("Store error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
                }
            },

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_not_found_maps_to_404() {
        let response = AppError::Ledger(LedgerError::AccountNotFound(42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_operation_type_maps_to_400() {
        let response = AppError::Ledger(LedgerError::InvalidOperationType(9)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_limit_exceeded_maps_to_422() {
        let err = AppError::Ledger(LedgerError::LimitExceeded {
            requested: dec!(1200.00),
            available: dec!(1000.00),
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_duplicate_document_maps_to_409() {
        let response = AppError::DocumentNumberTaken.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
