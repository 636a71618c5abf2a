//! Ledger store
//!
//! Interface boundary to the backing store: account lookup, the operation
//! catalog, the idempotency-key index, and the atomic posting commit.
//! `PgLedgerStore` is the production backend; `MemoryLedgerStore` backs the
//! test suite and embedded use.

mod memory;
mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

use crate::domain::{Account, NewPosting, OperationType, TransactionRecord};

/// Ledger store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catalog row carries a multiplier outside {+1, -1}
    #[error("Operation type {operation_type_id} is corrupt: {source}")]
    CorruptOperationType {
        operation_type_id: i64,
        source: crate::domain::InvalidMultiplier,
    },
}

/// Failure modes of the atomic posting commit
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// A transaction with this idempotency key was inserted concurrently.
    /// The caller should re-read by key and return the winner's record.
    #[error("Idempotency key already exists")]
    DuplicateKey,

    /// The stored balance no longer matches the balance the posting was
    /// prepared against. The caller should re-run the whole pipeline.
    #[error("Account balance changed since it was read")]
    BalanceChanged,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Storage operations the transaction processor depends on.
///
/// `commit_posting` must persist the transaction row and the balance update
/// as one atomic unit: either both take effect or neither does. Idempotency
/// keys are enforced by the store, not just by the processor's pre-check.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    /// Load an account by id.
    async fn account(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Resolve an operation type from the catalog. Read-only reference data.
    async fn operation_type(&self, id: i64) -> Result<Option<OperationType>, StoreError>;

    /// Find the transaction previously recorded under an idempotency key.
    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<TransactionRecord>, StoreError>;

    /// Atomically insert the transaction and move the account balance from
    /// `expected_balance` to `new_balance`.
    async fn commit_posting(&self, posting: NewPosting) -> Result<TransactionRecord, CommitError>;
}
