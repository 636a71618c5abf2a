//! Posting rules
//!
//! Sign normalization and the overdraft-limit balance rule as pure functions,
//! shared by every store backend.

use rust_decimal::Decimal;

use super::{Amount, Direction, LedgerError, OperationType};

/// Fixed allowance added to the current balance when deciding whether a
/// debit is permitted.
pub fn overdraft_buffer() -> Decimal {
    Decimal::new(1_000_00, 2)
}

/// Outcome of the balance rule: the signed amount to persist and the balance
/// the account must transition to.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub signed_amount: Decimal,
    pub new_balance: Decimal,
}

/// Apply the sign multiplier and the balance rule for one posting.
///
/// Debits are checked against `balance + overdraft_buffer()` and subtract the
/// unsigned magnitude; credits add it. Note the comparison and the balance
/// arithmetic intentionally use the unsigned magnitude rather than the signed
/// amount that gets persisted.
pub fn prepare(
    operation: &OperationType,
    balance: Decimal,
    amount: &Amount,
) -> Result<Posting, LedgerError> {
    let magnitude = amount.value();

    match operation.direction {
        Direction::Debit => {
            let limit = balance + overdraft_buffer();
            if limit < magnitude {
                return Err(LedgerError::LimitExceeded {
                    requested: magnitude,
                    available: limit,
                });
            }
            Ok(Posting {
                signed_amount: -magnitude,
                new_balance: balance - magnitude,
            })
        }
        Direction::Credit => Ok(Posting {
            signed_amount: magnitude,
            new_balance: balance + magnitude,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn debit_type() -> OperationType {
        OperationType {
            id: 3,
            description: "WITHDRAWAL".to_string(),
            direction: Direction::Debit,
        }
    }

    fn credit_type() -> OperationType {
        OperationType {
            id: 4,
            description: "PAYMENT".to_string(),
            direction: Direction::Credit,
        }
    }

    #[test]
    fn test_debit_normalizes_sign_and_reduces_balance() {
        let amount = Amount::new(dec!(100.00)).unwrap();
        let posting = prepare(&debit_type(), dec!(0), &amount).unwrap();
        assert_eq!(posting.signed_amount, dec!(-100.00));
        assert_eq!(posting.new_balance, dec!(-100.00));
    }

    #[test]
    fn test_credit_keeps_sign_and_raises_balance() {
        let amount = Amount::new(dec!(50.00)).unwrap();
        let posting = prepare(&credit_type(), dec!(-100.00), &amount).unwrap();
        assert_eq!(posting.signed_amount, dec!(50.00));
        assert_eq!(posting.new_balance, dec!(-50.00));
    }

    #[test]
    fn test_debit_within_overdraft_buffer_allowed() {
        // Balance 0, buffer 1000: a debit of exactly 1000 is the boundary
        let amount = Amount::new(dec!(1000.00)).unwrap();
        let posting = prepare(&debit_type(), dec!(0), &amount).unwrap();
        assert_eq!(posting.new_balance, dec!(-1000.00));
    }

    #[test]
    fn test_debit_past_overdraft_buffer_rejected() {
        let amount = Amount::new(dec!(1000.01)).unwrap();
        let result = prepare(&debit_type(), dec!(0), &amount);
        assert!(matches!(
            result,
            Err(LedgerError::LimitExceeded { requested, available })
                if requested == dec!(1000.01) && available == dec!(1000.00)
        ));
    }

    #[test]
    fn test_limit_accounts_for_negative_balance() {
        // Balance -100: only 900 of the buffer remains
        let amount = Amount::new(dec!(900.01)).unwrap();
        assert!(prepare(&debit_type(), dec!(-100.00), &amount).is_err());

        let amount = Amount::new(dec!(900.00)).unwrap();
        assert!(prepare(&debit_type(), dec!(-100.00), &amount).is_ok());
    }

    #[test]
    fn test_credit_never_limited() {
        let amount = Amount::new(dec!(99999.00)).unwrap();
        let posting = prepare(&credit_type(), dec!(-1000.00), &amount).unwrap();
        assert_eq!(posting.new_balance, dec!(98999.00));
    }
}
