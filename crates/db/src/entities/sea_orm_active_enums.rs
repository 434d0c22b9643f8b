//! Native database enums shared by the entity definitions.
//!
//! The Postgres enums map onto `kasku_core` domain enums one to one; the
//! `From` impls at the bottom keep the two families from drifting apart.
//! `QueueEntryStatus` is string-backed because it lives in the SQLite queue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of money account (`account_kind` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "investment")]
    Investment,
    #[sea_orm(string_value = "e_wallet")]
    EWallet,
}

/// Direction of a category (`category_kind` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "category_kind")]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "income")]
    Income,
}

/// Classification of a transaction row (`transaction_kind` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    #[sea_orm(string_value = "installment_payment")]
    InstallmentPayment,
}

/// Lifecycle of a transaction row (`transaction_status` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "voided")]
    Voided,
}

/// Stored installment state (`installment_status` Postgres enum).
///
/// Overdue is never stored; it is derived from the due date on read.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "installment_status")]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Replay state of a queued offline operation (SQLite, string-backed).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum QueueEntryStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "failed")]
    Failed,
}

// ============================================================================
// Conversions to/from the core domain enums
// ============================================================================

impl From<kasku_core::ledger::AccountKind> for AccountKind {
    fn from(kind: kasku_core::ledger::AccountKind) -> Self {
        match kind {
            kasku_core::ledger::AccountKind::Bank => Self::Bank,
            kasku_core::ledger::AccountKind::Cash => Self::Cash,
            kasku_core::ledger::AccountKind::Credit => Self::Credit,
            kasku_core::ledger::AccountKind::Investment => Self::Investment,
            kasku_core::ledger::AccountKind::EWallet => Self::EWallet,
        }
    }
}

impl From<AccountKind> for kasku_core::ledger::AccountKind {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Bank => Self::Bank,
            AccountKind::Cash => Self::Cash,
            AccountKind::Credit => Self::Credit,
            AccountKind::Investment => Self::Investment,
            AccountKind::EWallet => Self::EWallet,
        }
    }
}

impl From<kasku_core::ledger::TransactionKind> for TransactionKind {
    fn from(kind: kasku_core::ledger::TransactionKind) -> Self {
        match kind {
            kasku_core::ledger::TransactionKind::Expense => Self::Expense,
            kasku_core::ledger::TransactionKind::Income => Self::Income,
            kasku_core::ledger::TransactionKind::TransferOut => Self::TransferOut,
            kasku_core::ledger::TransactionKind::TransferIn => Self::TransferIn,
            kasku_core::ledger::TransactionKind::InstallmentPayment => Self::InstallmentPayment,
        }
    }
}

impl From<TransactionKind> for kasku_core::ledger::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Income => Self::Income,
            TransactionKind::TransferOut => Self::TransferOut,
            TransactionKind::TransferIn => Self::TransferIn,
            TransactionKind::InstallmentPayment => Self::InstallmentPayment,
        }
    }
}

impl From<kasku_core::ledger::TransactionStatus> for TransactionStatus {
    fn from(status: kasku_core::ledger::TransactionStatus) -> Self {
        match status {
            kasku_core::ledger::TransactionStatus::Posted => Self::Posted,
            kasku_core::ledger::TransactionStatus::Voided => Self::Voided,
        }
    }
}

impl From<TransactionStatus> for kasku_core::ledger::TransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Posted => Self::Posted,
            TransactionStatus::Voided => Self::Voided,
        }
    }
}

impl From<kasku_core::installment::InstallmentStatus> for InstallmentStatus {
    fn from(status: kasku_core::installment::InstallmentStatus) -> Self {
        match status {
            kasku_core::installment::InstallmentStatus::Active => Self::Active,
            kasku_core::installment::InstallmentStatus::Completed => Self::Completed,
        }
    }
}

impl From<InstallmentStatus> for kasku_core::installment::InstallmentStatus {
    fn from(status: InstallmentStatus) -> Self {
        match status {
            InstallmentStatus::Active => Self::Active,
            InstallmentStatus::Completed => Self::Completed,
        }
    }
}
