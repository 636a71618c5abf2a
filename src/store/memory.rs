//! In-memory ledger store
//!
//! Mutex-guarded maps with a compare-and-swap commit. Serves the test suite
//! and embedded callers that run without an external database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{Account, Direction, NewPosting, OperationType, TransactionRecord};

use super::{CommitError, LedgerStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<i64, Account>,
    operation_types: HashMap<i64, OperationType>,
    transactions: HashMap<i64, TransactionRecord>,
    key_index: HashMap<String, i64>,
    next_account_id: i64,
    next_transaction_id: i64,
}

/// Ledger store held entirely in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("ledger store mutex poisoned")
    }

    /// Create an account with a zero balance and return it.
    pub fn create_account(&self, document_number: &str) -> Account {
        let mut inner = self.lock();
        inner.next_account_id += 1;
        let now = Utc::now();
        let account = Account {
            id: inner.next_account_id,
            document_number: document_number.to_string(),
            balance: Decimal::ZERO,
            created_on: now,
            updated_on: now,
        };
        inner.accounts.insert(account.id, account.clone());
        account
    }

    /// Register an operation type in the catalog.
    pub fn insert_operation_type(&self, id: i64, description: &str, direction: Direction) {
        self.lock().operation_types.insert(
            id,
            OperationType {
                id,
                description: description.to_string(),
                direction,
            },
        );
    }

    /// Seed the four standard catalog entries.
    pub fn seed_default_operation_types(&self) {
        self.insert_operation_type(1, "CASH PURCHASE", Direction::Debit);
        self.insert_operation_type(2, "INSTALLMENT PURCHASE", Direction::Debit);
        self.insert_operation_type(3, "WITHDRAWAL", Direction::Debit);
        self.insert_operation_type(4, "PAYMENT", Direction::Credit);
    }

    /// Current balance of an account, if it exists.
    pub fn balance(&self, account_id: i64) -> Option<Decimal> {
        self.lock().accounts.get(&account_id).map(|a| a.balance)
    }

    /// Total number of persisted transactions.
    pub fn transaction_count(&self) -> usize {
        self.lock().transactions.len()
    }
}

impl LedgerStore for MemoryLedgerStore {
    async fn account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.lock().accounts.get(&id).cloned())
    }

    async fn operation_type(&self, id: i64) -> Result<Option<OperationType>, StoreError> {
        Ok(self.lock().operation_types.get(&id).cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .key_index
            .get(key)
            .and_then(|id| inner.transactions.get(id))
            .cloned())
    }

    async fn commit_posting(&self, posting: NewPosting) -> Result<TransactionRecord, CommitError> {
        let mut inner = self.lock();

        if inner.key_index.contains_key(&posting.idempotency_key) {
            return Err(CommitError::DuplicateKey);
        }

        {
            let account = inner
                .accounts
                .get_mut(&posting.account_id)
                .ok_or(CommitError::BalanceChanged)?;
            if account.balance != posting.expected_balance {
                return Err(CommitError::BalanceChanged);
            }
            account.balance = posting.new_balance;
            account.updated_on = posting.event_date;
        }

        inner.next_transaction_id += 1;
        let record = TransactionRecord {
            id: inner.next_transaction_id,
            account_id: posting.account_id,
            operation_type_id: posting.operation_type_id,
            amount: posting.signed_amount,
            event_date: posting.event_date,
            idempotency_key: posting.idempotency_key,
        };
        inner
            .key_index
            .insert(record.idempotency_key.clone(), record.id);
        inner.transactions.insert(record.id, record.clone());

        Ok(record)
    }
}
