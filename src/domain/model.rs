//! Ledger model types
//!
//! Accounts, the operation-type catalog, and persisted transaction records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A customer account with its running balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub document_number: String,
    pub balance: Decimal,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Sign of an operation type. The catalog stores multipliers as +1/-1;
/// any other value is rejected at the conversion boundary so it can never
/// enter the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    /// The stored sign multiplier for this direction.
    pub fn multiplier(self) -> i16 {
        match self {
            Direction::Credit => 1,
            Direction::Debit => -1,
        }
    }

    /// Apply the sign to an unsigned magnitude.
    pub fn signed(self, magnitude: Decimal) -> Decimal {
        match self {
            Direction::Credit => magnitude,
            Direction::Debit => -magnitude,
        }
    }
}

/// A sign multiplier outside {+1, -1} was read from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid sign multiplier: {0} (expected +1 or -1)")]
pub struct InvalidMultiplier(pub i16);

impl TryFrom<i16> for Direction {
    type Error = InvalidMultiplier;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Credit),
            -1 => Ok(Direction::Debit),
            other => Err(InvalidMultiplier(other)),
        }
    }
}

/// Immutable reference data describing one kind of operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationType {
    pub id: i64,
    pub description: String,
    pub direction: Direction,
}

/// A persisted transaction. Append-only: never mutated or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: i64,
    pub account_id: i64,
    pub operation_type_id: i64,
    /// Signed amount (direction applied to the client magnitude).
    pub amount: Decimal,
    pub event_date: DateTime<Utc>,
    pub idempotency_key: String,
}

/// A fully validated posting ready for atomic commit: the transaction row to
/// insert plus the balance transition it must be committed with.
#[derive(Debug, Clone)]
pub struct NewPosting {
    pub account_id: i64,
    pub operation_type_id: i64,
    pub signed_amount: Decimal,
    pub event_date: DateTime<Utc>,
    pub idempotency_key: String,
    /// Balance the limit check was evaluated against. The commit must fail
    /// if the stored balance no longer matches.
    pub expected_balance: Decimal,
    pub new_balance: Decimal,
}
