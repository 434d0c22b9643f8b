//! Property tests for balance arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::ledger::balance::{credit_balance, debit_balance, edited_balance, restored_balance};
use crate::ledger::error::LedgerError;
use crate::ledger::types::TransactionKind;

/// Strategy for positive amounts with two decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for non-negative starting balances.
fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy over every transaction kind.
fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Expense),
        Just(TransactionKind::Income),
        Just(TransactionKind::TransferOut),
        Just(TransactionKind::TransferIn),
        Just(TransactionKind::InstallmentPayment),
    ]
}

proptest! {
    // `prop_overdraw_is_rejected` filters on `amount > balance`, which the
    // strategy ranges satisfy only ~5% of the time; the default global reject
    // budget (1024) is too small to collect 100 cases through that filter.
    #![proptest_config(ProptestConfig {
        max_global_rejects: 8192,
        ..ProptestConfig::with_cases(100)
    })]

    // ========================================================================
    // Debit / credit arithmetic
    // ========================================================================

    /// **A successful debit removes exactly the requested amount**
    ///
    /// *For any* balance B and amount a with a <= B, the debited balance is
    /// B - a and never negative.
    #[test]
    fn prop_debit_removes_exact_amount(
        balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assume!(amount <= balance);

        let after = debit_balance(balance, amount).unwrap();
        prop_assert_eq!(after, balance - amount);
        prop_assert!(after >= Decimal::ZERO);
    }

    /// **An overdrawing debit is rejected and reports both sides**
    ///
    /// *For any* balance B and amount a with a > B, the debit fails with the
    /// insufficiency error carrying the exact available and requested values.
    #[test]
    fn prop_overdraw_is_rejected(
        balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assume!(amount > balance);

        match debit_balance(balance, amount) {
            Err(LedgerError::InsufficientBalance { available, requested }) => {
                prop_assert_eq!(available, balance);
                prop_assert_eq!(requested, amount);
            }
            other => prop_assert!(false, "expected insufficiency, got {other:?}"),
        }
    }

    /// **A credit adds exactly the requested amount**
    #[test]
    fn prop_credit_adds_exact_amount(
        balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assert_eq!(credit_balance(balance, amount).unwrap(), balance + amount);
    }

    // ========================================================================
    // Reversal round trips
    // ========================================================================

    /// **Reversal restores the prior balance exactly**
    ///
    /// *For any* kind, balance, and amount, applying the signed effect and
    /// then restoring it returns the original balance with no residue.
    #[test]
    fn prop_restore_is_exact_inverse(
        kind in kind_strategy(),
        balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        let applied = balance + kind.signed_effect(amount);
        prop_assert_eq!(restored_balance(kind, applied, amount), balance);
    }

    /// **The signed effect has the transaction's magnitude**
    #[test]
    fn prop_signed_effect_magnitude(
        kind in kind_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assert_eq!(kind.signed_effect(amount).abs(), amount);
    }

    // ========================================================================
    // Edit flow
    // ========================================================================

    /// **An edit moves the balance by the amount difference**
    ///
    /// *For any* posted debit of `old` and sufficient restored balance, the
    /// edited balance differs from the current one by exactly old - new.
    #[test]
    fn prop_edit_moves_by_difference(
        balance_before in balance_strategy(),
        old in amount_strategy(),
        new in amount_strategy(),
    ) {
        prop_assume!(old <= balance_before);
        prop_assume!(new <= balance_before);

        let current = balance_before - old;
        let after = edited_balance(TransactionKind::Expense, current, old, new).unwrap();
        prop_assert_eq!(after, current + old - new);
        prop_assert_eq!(after, balance_before - new);
    }

    /// **Editing to the same amount is a no-op**
    #[test]
    fn prop_edit_same_amount_is_noop(
        kind in kind_strategy(),
        balance_before in balance_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assume!(!kind.is_debit() || amount <= balance_before);

        let current = balance_before + kind.signed_effect(amount);
        let after = edited_balance(kind, current, amount, amount).unwrap();
        prop_assert_eq!(after, current);
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// **A transfer conserves the combined balance**
    ///
    /// *For any* two balances and a transferable amount, debiting one side
    /// and crediting the other leaves the sum unchanged.
    #[test]
    fn prop_transfer_conserves_total(
        from in balance_strategy(),
        to in balance_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assume!(amount <= from);

        let from_after = debit_balance(from, amount).unwrap();
        let to_after = credit_balance(to, amount).unwrap();
        prop_assert_eq!(from_after + to_after, from + to);
    }
}
