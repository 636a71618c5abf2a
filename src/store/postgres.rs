//! Postgres ledger store
//!
//! Row-level locking (`SELECT ... FOR UPDATE`) keeps the limit check and the
//! balance write mutually consistent; the unique index on
//! `transactions.idempotency_key` closes the check-then-insert race.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::{Account, Direction, NewPosting, OperationType, TransactionRecord};

use super::{CommitError, LedgerStore, StoreError};

/// Ledger store backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type TransactionRow = (i64, i64, i64, Decimal, DateTime<Utc>, String);

fn record_from_row(row: TransactionRow) -> TransactionRecord {
    let (id, account_id, operation_type_id, amount, event_date, idempotency_key) = row;
    TransactionRecord {
        id,
        account_id,
        operation_type_id,
        amount,
        event_date,
        idempotency_key,
    }
}

impl LedgerStore for PgLedgerStore {
    async fn account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let row: Option<(i64, String, Decimal, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, document_number, balance, created_on, updated_on
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(id, document_number, balance, created_on, updated_on)| Account {
                id,
                document_number,
                balance,
                created_on,
                updated_on,
            },
        ))
    }

    async fn operation_type(&self, id: i64) -> Result<Option<OperationType>, StoreError> {
        let row: Option<(i64, String, i16)> = sqlx::query_as(
            r#"
            SELECT id, description, sign_multiplier
            FROM operation_types
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some((id, description, multiplier)) => {
                let direction = Direction::try_from(multiplier).map_err(|source| {
                    StoreError::CorruptOperationType {
                        operation_type_id: id,
                        source,
                    }
                })?;
                Ok(Some(OperationType {
                    id,
                    description,
                    direction,
                }))
            }
        }
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, operation_type_id, amount, event_date, idempotency_key
            FROM transactions
            WHERE idempotency_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(record_from_row))
    }

    async fn commit_posting(&self, posting: NewPosting) -> Result<TransactionRecord, CommitError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        // Lock the account row for the duration of the check-then-write
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(posting.account_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(StoreError::from)?;

        // A vanished row is treated like a stale read: the caller re-runs the
        // pipeline and surfaces AccountNotFound from the fresh lookup.
        let Some(balance) = balance else {
            return Err(CommitError::BalanceChanged);
        };

        if balance != posting.expected_balance {
            return Err(CommitError::BalanceChanged);
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (account_id, operation_type_id, amount, event_date, idempotency_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(posting.account_id)
        .bind(posting.operation_type_id)
        .bind(posting.signed_amount)
        .bind(posting.event_date)
        .bind(&posting.idempotency_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CommitError::DuplicateKey,
            _ => CommitError::Store(StoreError::Database(e)),
        })?;

        sqlx::query("UPDATE accounts SET balance = $2, updated_on = NOW() WHERE id = $1")
            .bind(posting.account_id)
            .bind(posting.new_balance)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

        tx.commit().await.map_err(StoreError::from)?;

        Ok(TransactionRecord {
            id,
            account_id: posting.account_id,
            operation_type_id: posting.operation_type_id,
            amount: posting.signed_amount,
            event_date: posting.event_date,
            idempotency_key: posting.idempotency_key,
        })
    }
}
