//! Domain events emitted after ledger mutations commit.
//!
//! Pure data. The API layer broadcasts these over WebSocket so open clients
//! can refresh balances without polling; nothing in here touches a socket.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasku_shared::types::{AccountId, InstallmentId, OwnerId, TransactionId};

use crate::ledger::TransactionKind;

/// Something observable happened to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A transaction posted and the account balance moved.
    TransactionPosted {
        /// Owner whose ledger changed.
        owner_id: OwnerId,
        /// The new transaction.
        transaction_id: TransactionId,
        /// Account whose balance moved.
        account_id: AccountId,
        /// Direction of the movement.
        kind: TransactionKind,
        /// Magnitude of the movement.
        amount: Decimal,
        /// Balance after the movement.
        new_balance: Decimal,
    },
    /// A posted transaction was voided and its balance effect undone.
    TransactionReversed {
        /// Owner whose ledger changed.
        owner_id: OwnerId,
        /// The voided transaction.
        transaction_id: TransactionId,
        /// Account whose balance was restored.
        account_id: AccountId,
        /// Balance after the restore.
        new_balance: Decimal,
    },
    /// A new installment plan exists.
    InstallmentCreated {
        /// Owner whose ledger changed.
        owner_id: OwnerId,
        /// The new plan.
        installment_id: InstallmentId,
        /// Total to repay across all periods.
        total_payable: Decimal,
    },
    /// Periods were paid against an installment.
    InstallmentProgressed {
        /// Owner whose ledger changed.
        owner_id: OwnerId,
        /// The plan that progressed.
        installment_id: InstallmentId,
        /// Periods paid so far, after this payment.
        paid_periods: u32,
        /// Amount still owed, after this payment.
        remaining_amount: Decimal,
        /// Whether this payment finished the plan.
        completed: bool,
    },
    /// The device's connectivity state flipped.
    ConnectivityChanged {
        /// True when the store of record is reachable again.
        online: bool,
    },
    /// An offline queue drain finished.
    SyncCompleted {
        /// Owner whose queue drained.
        owner_id: OwnerId,
        /// Entries replayed successfully.
        replayed: u32,
        /// Entries that failed and stayed queued.
        failed: u32,
    },
}

impl LedgerEvent {
    /// The owner this event concerns, or `None` for device-wide events.
    #[must_use]
    pub const fn owner_id(&self) -> Option<OwnerId> {
        match self {
            Self::TransactionPosted { owner_id, .. }
            | Self::TransactionReversed { owner_id, .. }
            | Self::InstallmentCreated { owner_id, .. }
            | Self::InstallmentProgressed { owner_id, .. }
            | Self::SyncCompleted { owner_id, .. } => Some(*owner_id),
            Self::ConnectivityChanged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_event_json_is_type_tagged() {
        let event = LedgerEvent::InstallmentProgressed {
            owner_id: OwnerId::new(),
            installment_id: InstallmentId::new(),
            paid_periods: 3,
            remaining_amount: dec!(440.00),
            completed: false,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "installment_progressed");
        assert_eq!(json["paid_periods"], 3);
        assert_eq!(json["remaining_amount"], "440.00");
    }

    #[test]
    fn test_connectivity_event_round_trips() {
        let event = LedgerEvent::ConnectivityChanged { online: true };
        let json = serde_json::to_string(&event).unwrap();
        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_owner_scoping() {
        let owner = OwnerId::new();
        let scoped = LedgerEvent::SyncCompleted {
            owner_id: owner,
            replayed: 2,
            failed: 0,
        };
        assert_eq!(scoped.owner_id(), Some(owner));

        let global = LedgerEvent::ConnectivityChanged { online: false };
        assert_eq!(global.owner_id(), None);
    }

    #[test]
    fn test_transaction_posted_carries_kind() {
        let event = LedgerEvent::TransactionPosted {
            owner_id: OwnerId::new(),
            transaction_id: TransactionId::new(),
            account_id: AccountId::new(),
            kind: TransactionKind::Expense,
            amount: dec!(120.50),
            new_balance: dec!(879.50),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "expense");
    }
}
