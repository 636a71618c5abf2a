//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{Amount, LedgerError};
use crate::error::AppError;
use crate::processor::{PostTransaction, TransactionProcessor};
use crate::store::PgLedgerStore;

/// Header carrying the client's idempotency key
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

const DOCUMENT_NUMBER_MAX_LEN: usize = 10;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub document_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account_id: i64,
    pub document_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub account_id: i64,
    pub operation_type_id: i64,
    /// Unsigned magnitude; the operation type decides the sign
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction_id: i64,
    pub account_id: i64,
    pub operation_type_id: i64,
    /// Signed amount as persisted
    pub amount: Decimal,
    pub event_date: DateTime<Utc>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        .route("/health", get(health_check))
        .route("/accounts", post(create_account))
        .route("/accounts/:account_id", get(get_account))
        .route("/transactions", post(create_transaction))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// =========================================================================
// POST /accounts
// =========================================================================

/// Create a new account with a zero balance
async fn create_account(
    State(pool): State<PgPool>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let document_number = request.document_number.trim();
    if document_number.is_empty() {
        return Err(AppError::InvalidRequest(
            "Document number is required".to_string(),
        ));
    }
    if document_number.chars().count() > DOCUMENT_NUMBER_MAX_LEN {
        return Err(AppError::InvalidRequest(format!(
            "Document number must be at most {} characters",
            DOCUMENT_NUMBER_MAX_LEN
        )));
    }

    tracing::info!(document_number, "Creating account");

    let (account_id, document_number): (i64, String) = sqlx::query_as(
        r#"
        INSERT INTO accounts (document_number)
        VALUES ($1)
        RETURNING id, document_number
        "#,
    )
    .bind(document_number)
    .fetch_one(&pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DocumentNumberTaken,
        _ => AppError::Database(e),
    })?;

    tracing::info!(account_id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            account_id,
            document_number,
        }),
    ))
}

// =========================================================================
// GET /accounts/:account_id
// =========================================================================

/// Get account by ID
async fn get_account(
    State(pool): State<PgPool>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, AppError> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, document_number FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&pool)
            .await?;

    let (account_id, document_number) =
        row.ok_or(AppError::Ledger(LedgerError::AccountNotFound(account_id)))?;

    Ok(Json(AccountResponse {
        account_id,
        document_number,
    }))
}

// =========================================================================
// POST /transactions
// =========================================================================

/// Post a transaction. The Idempotency-Key header makes retries safe: the
/// same key always returns the originally persisted transaction.
async fn create_transaction(
    State(pool): State<PgPool>,
    headers: HeaderMap,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::MissingHeader(IDEMPOTENCY_KEY_HEADER.to_string()))?;

    let amount = Amount::new(request.amount)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {}", e)))?;

    let processor = TransactionProcessor::new(PgLedgerStore::new(pool));

    let record = processor
        .post(PostTransaction {
            account_id: request.account_id,
            operation_type_id: request.operation_type_id,
            amount,
            idempotency_key: idempotency_key.to_string(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction_id: record.id,
            account_id: record.account_id,
            operation_type_id: record.operation_type_id,
            amount: record.amount,
            event_date: record.event_date,
        }),
    ))
}
