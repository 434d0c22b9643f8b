//! Offline intent payloads.
//!
//! One variant per intent, tagged by `intent` in the serialized JSON. The
//! queue's op-kind and entity-kind columns come from [`OfflinePayload::op_kind`]
//! and [`OfflinePayload::entity_kind`], so they can never disagree with the
//! payload they index.

use chrono::NaiveDate;
use kasku_shared::types::{AccountId, CategoryId, InstallmentId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::offline::drain::{EntityKind, OpKind};

/// A mutation recorded while offline, awaiting replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum OfflinePayload {
    /// Record a new expense.
    CreateExpense(EntryDraft),
    /// Record a new income.
    CreateIncome(EntryDraft),
    /// Create a new installment plan.
    CreateInstallment(InstallmentDraft),
    /// Edit a posted expense (reverse-then-reapply on replay).
    UpdateExpense(TransactionEdit),
    /// Edit a posted income (reverse-then-reapply on replay).
    UpdateIncome(TransactionEdit),
    /// Edit an installment, or pay periods against it.
    UpdateInstallment(InstallmentUpdate),
    /// Delete (reverse) a posted expense.
    DeleteExpense(TransactionRef),
    /// Delete (reverse) a posted income.
    DeleteIncome(TransactionRef),
    /// Delete an installment plan.
    DeleteInstallment(InstallmentRef),
}

impl OfflinePayload {
    /// The queue group this intent drains in.
    #[must_use]
    pub const fn op_kind(&self) -> OpKind {
        match self {
            Self::CreateExpense(_) | Self::CreateIncome(_) | Self::CreateInstallment(_) => {
                OpKind::Create
            }
            Self::UpdateExpense(_) | Self::UpdateIncome(_) | Self::UpdateInstallment(_) => {
                OpKind::Update
            }
            Self::DeleteExpense(_) | Self::DeleteIncome(_) | Self::DeleteInstallment(_) => {
                OpKind::Delete
            }
        }
    }

    /// The entity family this intent targets.
    #[must_use]
    pub const fn entity_kind(&self) -> EntityKind {
        match self {
            Self::CreateExpense(_) | Self::UpdateExpense(_) | Self::DeleteExpense(_) => {
                EntityKind::Expense
            }
            Self::CreateIncome(_) | Self::UpdateIncome(_) | Self::DeleteIncome(_) => {
                EntityKind::Income
            }
            Self::CreateInstallment(_)
            | Self::UpdateInstallment(_)
            | Self::DeleteInstallment(_) => EntityKind::Installment,
        }
    }
}

/// Draft of a new expense or income row; the enclosing variant fixes which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Account the amount moves against.
    pub account_id: AccountId,
    /// Spending or income category.
    pub category_id: CategoryId,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Draft of a new installment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentDraft {
    /// Display title.
    pub title: String,
    /// Amount borrowed.
    pub principal: Decimal,
    /// Number of periods.
    pub term_count: u32,
    /// Flat periodic rate, in percent.
    pub periodic_rate_percent: Decimal,
    /// Date the plan falls due.
    pub due_date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// New values for an existing expense or income row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEdit {
    /// The transaction being edited.
    pub transaction_id: TransactionId,
    /// New positive magnitude.
    pub amount: Decimal,
    /// Account the re-applied row posts against (may equal the original).
    pub account_id: AccountId,
    /// Replacement category, when changing it.
    pub category_id: Option<CategoryId>,
    /// Replacement notes, when changing them.
    pub notes: Option<String>,
}

/// Reference to a transaction targeted for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRef {
    /// The transaction to reverse.
    pub transaction_id: TransactionId,
}

/// Reference to an installment targeted for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentRef {
    /// The installment to delete.
    pub installment_id: InstallmentId,
}

/// The two update intents an installment supports.
///
/// An offline period payment is an update intent: on replay it goes through
/// the installment payment processor exactly as an online call would.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InstallmentUpdate {
    /// Edit plan fields.
    Edit(InstallmentEdit),
    /// Pay one or more periods.
    PayPeriods(PaymentDraft),
}

/// New values for an existing installment.
///
/// Schedule inputs (principal, term count, rate) are only accepted while no
/// period has been paid; the processor rejects them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentEdit {
    /// The installment being edited.
    pub installment_id: InstallmentId,
    /// New title, when changing it.
    pub title: Option<String>,
    /// New due date, when changing it.
    pub due_date: Option<NaiveDate>,
    /// New notes, when changing them.
    pub notes: Option<String>,
    /// New principal; locked once payments exist.
    pub principal: Option<Decimal>,
    /// New term count; locked once payments exist.
    pub term_count: Option<u32>,
    /// New periodic rate; locked once payments exist.
    pub periodic_rate_percent: Option<Decimal>,
}

/// A "pay N periods" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDraft {
    /// The installment being paid.
    pub installment_id: InstallmentId,
    /// Number of periods to cover; clamped to the periods remaining.
    pub periods_count: u32,
    /// Account the payment debits.
    pub account_id: AccountId,
    /// Payment date.
    pub date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}
