//! Transaction processor
//!
//! The idempotent posting pipeline: dedup by idempotency key, resolve the
//! account and operation type, normalize the sign, apply the balance rule,
//! and commit the transaction plus the balance update as one atomic unit.

use std::time::Duration;

use chrono::Utc;

use crate::domain::{posting, Amount, LedgerError, NewPosting, TransactionRecord};
use crate::store::{CommitError, LedgerStore};

/// Bounded retry for commits that lose a balance race
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// A posting request as received from the caller.
#[derive(Debug, Clone)]
pub struct PostTransaction {
    pub account_id: i64,
    pub operation_type_id: i64,
    /// Unsigned magnitude; the operation type decides the sign.
    pub amount: Amount,
    /// Client-supplied token. Retries of the same logical request must reuse it.
    pub idempotency_key: String,
}

/// Executes postings against a ledger store.
#[derive(Debug, Clone)]
pub struct TransactionProcessor<S> {
    store: S,
}

impl<S: LedgerStore> TransactionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Post a transaction exactly once per idempotency key.
    ///
    /// Repeating the call with the same key after a success returns the
    /// original record with no new side effect. Validation failures
    /// short-circuit before any mutation.
    pub async fn post(&self, request: PostTransaction) -> Result<TransactionRecord, LedgerError> {
        if request.idempotency_key.trim().is_empty() {
            return Err(LedgerError::EmptyIdempotencyKey);
        }

        tracing::info!(
            account_id = request.account_id,
            operation_type_id = request.operation_type_id,
            amount = %request.amount,
            "Initiating transaction"
        );

        if let Some(existing) = self
            .store
            .find_by_idempotency_key(&request.idempotency_key)
            .await?
        {
            tracing::info!(
                transaction_id = existing.id,
                "Idempotency hit, returning stored transaction"
            );
            return Ok(existing);
        }

        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let account = self.store.account(request.account_id).await?.ok_or_else(|| {
                tracing::error!(
                    account_id = request.account_id,
                    "Transaction failed: account does not exist"
                );
                LedgerError::AccountNotFound(request.account_id)
            })?;

            let operation = self
                .store
                .operation_type(request.operation_type_id)
                .await?
                .ok_or_else(|| {
                    tracing::error!(
                        operation_type_id = request.operation_type_id,
                        "Transaction failed: invalid operation type"
                    );
                    LedgerError::InvalidOperationType(request.operation_type_id)
                })?;

            let prepared = posting::prepare(&operation, account.balance, &request.amount)?;

            let new_posting = NewPosting {
                account_id: account.id,
                operation_type_id: operation.id,
                signed_amount: prepared.signed_amount,
                event_date: Utc::now(),
                idempotency_key: request.idempotency_key.clone(),
                expected_balance: account.balance,
                new_balance: prepared.new_balance,
            };

            match self.store.commit_posting(new_posting).await {
                Ok(record) => {
                    tracing::info!(
                        transaction_id = record.id,
                        amount = %record.amount,
                        "Transaction saved successfully"
                    );
                    return Ok(record);
                }
                Err(CommitError::DuplicateKey) => {
                    // Lost the insert race; the winner's row is canonical
                    if let Some(existing) = self
                        .store
                        .find_by_idempotency_key(&request.idempotency_key)
                        .await?
                    {
                        tracing::info!(
                            transaction_id = existing.id,
                            "Concurrent duplicate detected, returning winner's transaction"
                        );
                        return Ok(existing);
                    }
                    // Winner rolled back after raising the conflict; run again
                    continue;
                }
                Err(CommitError::BalanceChanged) => {
                    if attempt + 1 == MAX_COMMIT_ATTEMPTS {
                        return Err(LedgerError::BalanceContention);
                    }
                    let delay = Duration::from_millis(50 * (attempt as u64 + 1));
                    tracing::warn!(
                        account_id = request.account_id,
                        attempt = attempt + 1,
                        "Balance changed during commit, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(CommitError::Store(e)) => return Err(e.into()),
            }
        }

        Err(LedgerError::BalanceContention)
    }
}
