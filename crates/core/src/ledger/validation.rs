//! Validation rules applied before any store access.
//!
//! Every exposed ledger operation runs these checks first, so a request that
//! is structurally invalid never reaches the transactional scope.

use kasku_shared::types::{AccountId, CategoryId};
use rust_decimal::Decimal;

use crate::ledger::error::LedgerError;
use crate::ledger::types::TransactionKind;

/// Validates that an amount is a positive magnitude.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

/// Validates the account pair of a transfer.
pub fn validate_transfer_accounts(from: AccountId, to: AccountId) -> Result<(), LedgerError> {
    if from == to {
        return Err(LedgerError::SameAccountTransfer(from.into_inner()));
    }
    Ok(())
}

/// Validates that kinds requiring a category reference carry one.
pub fn validate_category(
    kind: TransactionKind,
    category_id: Option<CategoryId>,
) -> Result<(), LedgerError> {
    if kind.requires_category() && category_id.is_none() {
        return Err(LedgerError::Validation(format!(
            "{kind} transactions require a category id"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_positive_amount_passes() {
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert!(validate_amount(dec!(1_000_000)).is_ok());
    }

    #[test]
    fn test_non_positive_amount_fails() {
        assert!(matches!(
            validate_amount(dec!(0)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(dec!(-10)),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_transfer_to_distinct_account_passes() {
        assert!(validate_transfer_accounts(AccountId::new(), AccountId::new()).is_ok());
    }

    #[test]
    fn test_transfer_to_same_account_fails() {
        let account = AccountId::new();
        let err = validate_transfer_accounts(account, account).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::SameAccountTransfer(id) if id == account.into_inner()
        ));
    }

    #[test]
    fn test_expense_requires_category() {
        assert!(matches!(
            validate_category(TransactionKind::Expense, None),
            Err(LedgerError::Validation(_))
        ));
        assert!(validate_category(TransactionKind::Expense, Some(CategoryId::new())).is_ok());
    }

    #[test]
    fn test_income_requires_category() {
        assert!(matches!(
            validate_category(TransactionKind::Income, None),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_transfers_do_not_require_category() {
        assert!(validate_category(TransactionKind::TransferOut, None).is_ok());
        assert!(validate_category(TransactionKind::TransferIn, None).is_ok());
        assert!(validate_category(TransactionKind::InstallmentPayment, None).is_ok());
    }
}
