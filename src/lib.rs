//! ledger-api Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod processor;
pub mod store;

pub use config::Config;
pub use domain::{Account, Amount, AmountError, Direction, LedgerError, OperationType, TransactionRecord};
pub use error::{AppError, AppResult};
pub use processor::{PostTransaction, TransactionProcessor};
pub use store::{CommitError, LedgerStore, MemoryLedgerStore, PgLedgerStore, StoreError};
