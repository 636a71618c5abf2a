//! Ledger error types
//!
//! Failures the posting pipeline can surface to its caller. Independent of
//! the web layer; HTTP mapping lives in `crate::error`.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The target account does not exist
    #[error("Account not found with ID: {0}")]
    AccountNotFound(i64),

    /// The operation type has no catalog entry
    #[error("Invalid Operation Type ID: {0}")]
    InvalidOperationType(i64),

    /// A debit would exceed the account's limit
    #[error("Limit exceeded: requested {requested}, available {available}")]
    LimitExceeded {
        requested: Decimal,
        available: Decimal,
    },

    /// The idempotency key was blank
    #[error("Idempotency key must not be empty")]
    EmptyIdempotencyKey,

    /// Concurrent balance updates exhausted the commit retries
    #[error("Concurrent modification of account balance, retries exhausted")]
    BalanceContention,

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Check if this is a validation failure (no mutation was performed and
    /// retrying the same request cannot succeed).
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::InvalidOperationType(_)
                | Self::LimitExceeded { .. }
                | Self::EmptyIdempotencyKey
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limit_exceeded_message() {
        let err = LedgerError::LimitExceeded {
            requested: dec!(1200.00),
            available: dec!(1000.00),
        };
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("1200.00"));
        assert!(err.to_string().contains("1000.00"));
    }

    #[test]
    fn test_contention_is_not_validation() {
        assert!(!LedgerError::BalanceContention.is_validation_error());
        assert!(LedgerError::AccountNotFound(42).is_validation_error());
    }
}
