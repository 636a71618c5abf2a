//! Domain module
//!
//! Pure ledger types and posting rules, independent of storage and HTTP.

mod amount;
mod error;
mod model;
pub mod posting;

pub use amount::{Amount, AmountError};
pub use error::LedgerError;
pub use model::{Account, Direction, InvalidMultiplier, NewPosting, OperationType, TransactionRecord};
