//! Ledger domain types.
//!
//! Transactions are tagged variants: the kind discriminant decides the sign of
//! the balance effect and which reference fields are required, so invalid
//! combinations are rejected before any store access.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a ledger transaction.
///
/// The kind fixes the direction of the balance effect: expense, transfer-out
/// and installment-payment rows debit their account; income and transfer-in
/// rows credit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money leaving an account against a spending category.
    Expense,
    /// Money entering an account against an income category.
    Income,
    /// Outgoing half of an inter-account transfer.
    TransferOut,
    /// Incoming half of an inter-account transfer.
    TransferIn,
    /// Debit created by an installment period payment.
    InstallmentPayment,
}

impl TransactionKind {
    /// Returns true if this kind decreases the account balance.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(
            self,
            Self::Expense | Self::TransferOut | Self::InstallmentPayment
        )
    }

    /// The signed delta this transaction applies to its account balance.
    ///
    /// `amount` is the positive magnitude stored on the transaction row.
    #[must_use]
    pub fn signed_effect(self, amount: Decimal) -> Decimal {
        if self.is_debit() { -amount } else { amount }
    }

    /// Returns true if this kind requires a category reference.
    #[must_use]
    pub const fn requires_category(self) -> bool {
        matches!(self, Self::Expense | Self::Income)
    }

    /// Returns true if this kind requires a counterparty account.
    #[must_use]
    pub const fn requires_counterparty(self) -> bool {
        matches!(self, Self::TransferOut | Self::TransferIn)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::TransferOut => "transfer_out",
            Self::TransferIn => "transfer_in",
            Self::InstallmentPayment => "installment_payment",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "transfer_out" => Ok(Self::TransferOut),
            "transfer_in" => Ok(Self::TransferIn),
            "installment_payment" => Ok(Self::InstallmentPayment),
            _ => Err(format!("Unknown transaction kind: {s}")),
        }
    }
}

/// Lifecycle status of a committed transaction.
///
/// Rows are immutable once posted; the only transition is posted → voided via
/// the reverse flow. Edits void the original row and post a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Committed and contributing to the account balance.
    Posted,
    /// Reversed; its balance effect has been restored.
    Voided,
}

impl TransactionStatus {
    /// Returns true if the transaction still affects its account balance.
    #[must_use]
    pub const fn is_posted(self) -> bool {
        matches!(self, Self::Posted)
    }
}

/// Kind of money account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Bank account.
    Bank,
    /// Physical cash.
    Cash,
    /// Credit card or credit line.
    Credit,
    /// Investment account.
    Investment,
    /// Electronic wallet.
    EWallet,
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Credit => "credit",
            Self::Investment => "investment",
            Self::EWallet => "e_wallet",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bank" => Ok(Self::Bank),
            "cash" => Ok(Self::Cash),
            "credit" => Ok(Self::Credit),
            "investment" => Ok(Self::Investment),
            // Both spellings show up in client payloads.
            "e_wallet" | "e-wallet" | "ewallet" => Ok(Self::EWallet),
            _ => Err(format!("Unknown account kind: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_debit_kinds() {
        assert!(TransactionKind::Expense.is_debit());
        assert!(TransactionKind::TransferOut.is_debit());
        assert!(TransactionKind::InstallmentPayment.is_debit());
        assert!(!TransactionKind::Income.is_debit());
        assert!(!TransactionKind::TransferIn.is_debit());
    }

    #[test]
    fn test_signed_effect() {
        assert_eq!(
            TransactionKind::Expense.signed_effect(dec!(100)),
            dec!(-100)
        );
        assert_eq!(TransactionKind::Income.signed_effect(dec!(100)), dec!(100));
        assert_eq!(
            TransactionKind::TransferOut.signed_effect(dec!(25.50)),
            dec!(-25.50)
        );
        assert_eq!(
            TransactionKind::TransferIn.signed_effect(dec!(25.50)),
            dec!(25.50)
        );
    }

    #[test]
    fn test_required_references() {
        assert!(TransactionKind::Expense.requires_category());
        assert!(TransactionKind::Income.requires_category());
        assert!(!TransactionKind::TransferOut.requires_category());

        assert!(TransactionKind::TransferOut.requires_counterparty());
        assert!(TransactionKind::TransferIn.requires_counterparty());
        assert!(!TransactionKind::Expense.requires_counterparty());
        assert!(!TransactionKind::InstallmentPayment.requires_counterparty());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            TransactionKind::Expense,
            TransactionKind::Income,
            TransactionKind::TransferOut,
            TransactionKind::TransferIn,
            TransactionKind::InstallmentPayment,
        ] {
            assert_eq!(
                TransactionKind::from_str(&kind.to_string()).unwrap(),
                kind
            );
        }
    }

    #[test]
    fn test_account_kind_accepts_both_wallet_spellings() {
        assert_eq!(AccountKind::from_str("e_wallet").unwrap(), AccountKind::EWallet);
        assert_eq!(AccountKind::from_str("e-wallet").unwrap(), AccountKind::EWallet);
        assert_eq!(AccountKind::from_str("E-Wallet").unwrap(), AccountKind::EWallet);
        assert_eq!(AccountKind::EWallet.to_string(), "e_wallet");
    }

    #[test]
    fn test_account_kind_rejects_unknown() {
        assert!(AccountKind::from_str("crypto").is_err());
    }

    #[test]
    fn test_status_is_posted() {
        assert!(TransactionStatus::Posted.is_posted());
        assert!(!TransactionStatus::Voided.is_posted());
    }
}
