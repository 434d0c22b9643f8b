//! Balance arithmetic for ledger mutations.
//!
//! These functions are the single source of truth for how a balance moves:
//! the store repository reads the current balance inside its transactional
//! scope, runs one of these, and writes the result back under a version guard.
//! Keeping the arithmetic pure makes the consistency rules trivially testable.

use rust_decimal::Decimal;

use crate::ledger::error::LedgerError;
use crate::ledger::types::TransactionKind;

/// Computes the balance after a debit of `amount`.
///
/// Rejects non-positive amounts and debits that would overdraw the account.
pub fn debit_balance(current: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    if current < amount {
        return Err(LedgerError::InsufficientBalance {
            available: current,
            requested: amount,
        });
    }
    Ok(current - amount)
}

/// Computes the balance after a credit of `amount`.
///
/// Rejects non-positive amounts; credits have no sufficiency check.
pub fn credit_balance(current: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(current + amount)
}

/// Computes the balance after undoing a committed transaction's effect.
///
/// Reversal is exact: subtracting the signed effect returns the balance to
/// what it was before the transaction was applied. No sufficiency check runs
/// here; a reversed income may legitimately leave a negative balance.
#[must_use]
pub fn restored_balance(kind: TransactionKind, current: Decimal, amount: Decimal) -> Decimal {
    current - kind.signed_effect(amount)
}

/// Computes the balance after editing a transaction's amount on one account.
///
/// Restores the original effect, then re-applies the new amount. Debit kinds
/// re-check sufficiency against the restored balance, so an edit can never
/// overdraw the account through the back door.
pub fn edited_balance(
    kind: TransactionKind,
    current: Decimal,
    old_amount: Decimal,
    new_amount: Decimal,
) -> Result<Decimal, LedgerError> {
    let restored = restored_balance(kind, current, old_amount);
    if kind.is_debit() {
        debit_balance(restored, new_amount)
    } else {
        credit_balance(restored, new_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_reduces_balance() {
        assert_eq!(debit_balance(dec!(1000), dec!(300)).unwrap(), dec!(700));
    }

    #[test]
    fn test_debit_exact_balance_reaches_zero() {
        assert_eq!(debit_balance(dec!(300), dec!(300)).unwrap(), dec!(0));
    }

    #[test]
    fn test_debit_rejects_overdraw() {
        let err = debit_balance(dec!(100), dec!(100.01)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance {
                available,
                requested,
            } if available == dec!(100) && requested == dec!(100.01)
        ));
    }

    #[test]
    fn test_debit_rejects_non_positive_amounts() {
        assert!(matches!(
            debit_balance(dec!(100), dec!(0)).unwrap_err(),
            LedgerError::InvalidAmount(_)
        ));
        assert!(matches!(
            debit_balance(dec!(100), dec!(-5)).unwrap_err(),
            LedgerError::InvalidAmount(_)
        ));
    }

    #[test]
    fn test_credit_increases_balance() {
        assert_eq!(credit_balance(dec!(100), dec!(50)).unwrap(), dec!(150));
    }

    #[test]
    fn test_credit_rejects_non_positive_amounts() {
        assert!(matches!(
            credit_balance(dec!(100), dec!(0)).unwrap_err(),
            LedgerError::InvalidAmount(_)
        ));
    }

    #[test]
    fn test_restore_undoes_expense() {
        // Balance 900 after posting a 100 expense; restore returns 1000.
        assert_eq!(
            restored_balance(TransactionKind::Expense, dec!(900), dec!(100)),
            dec!(1000)
        );
    }

    #[test]
    fn test_restore_undoes_income() {
        assert_eq!(
            restored_balance(TransactionKind::Income, dec!(1100), dec!(100)),
            dec!(1000)
        );
    }

    #[test]
    fn test_restore_of_income_may_go_negative() {
        // The income was already spent; balances are signed, so this is legal.
        assert_eq!(
            restored_balance(TransactionKind::Income, dec!(40), dec!(100)),
            dec!(-60)
        );
    }

    #[test]
    fn test_edit_expense_upward_moves_balance_by_difference() {
        // Posted 100 with balance now 900; editing to 150 lands at 850.
        assert_eq!(
            edited_balance(TransactionKind::Expense, dec!(900), dec!(100), dec!(150)).unwrap(),
            dec!(850)
        );
    }

    #[test]
    fn test_edit_expense_downward_moves_balance_by_difference() {
        // Posted 100 with balance now 900; editing to 60 lands at 940.
        assert_eq!(
            edited_balance(TransactionKind::Expense, dec!(900), dec!(100), dec!(60)).unwrap(),
            dec!(940)
        );
    }

    #[test]
    fn test_edit_rejects_overdraw_after_restore() {
        // Restored balance is 1000; the new amount exceeds it.
        assert!(matches!(
            edited_balance(TransactionKind::Expense, dec!(900), dec!(100), dec!(1000.01))
                .unwrap_err(),
            LedgerError::InsufficientBalance { .. }
        ));
    }

    #[test]
    fn test_edit_income_adjusts_by_difference() {
        // Posted income 100 with balance 1100; editing to 250 lands at 1250.
        assert_eq!(
            edited_balance(TransactionKind::Income, dec!(1100), dec!(100), dec!(250)).unwrap(),
            dec!(1250)
        );
    }
}
