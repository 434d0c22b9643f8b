//! Replays queued offline operations against the store of record.
//!
//! A drain lists the owner's queued entries, replays them in group order
//! (creates, then updates, then deletes; enqueue order within a group) and
//! removes each entry once its operation is applied or confirmed as already
//! applied. A failed entry is marked and left in line; it never stops the
//! entries behind it.
//!
//! Replays are idempotent through the replay key: the queue entry id travels
//! into the row the operation creates, so a second attempt finds the row and
//! reports success without re-applying. The unique replay-key index in the
//! store of record backstops the race where two drains replay the same entry
//! concurrently.

use kasku_core::installment::InstallmentError;
use kasku_core::ledger::{LedgerError, TransactionKind};
use kasku_core::offline::{InstallmentUpdate, OfflinePayload, OpKind};
use kasku_shared::types::CategoryId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::pending_operations;
use crate::repositories::installment::{
    CreateInstallmentInput, PayPeriodsInput, UpdateInstallmentInput,
};
use crate::repositories::ledger::{TransactionEditInput, TransactionMeta};
use crate::repositories::queue::decode_payload;
use crate::repositories::{InstallmentRepository, LedgerRepository, QueueError, QueueRepository};

/// Errors a single entry replay can fail with.
#[derive(Debug, Error)]
pub enum SyncReplayError {
    /// The replayed ledger operation was rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The replayed installment operation was rejected.
    #[error(transparent)]
    Installment(#[from] InstallmentError),

    /// The entry itself could not be read or decoded.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// What a drain did, per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    /// Entries whose operation was applied to the store of record.
    pub replayed: u32,
    /// Entries whose replay failed; they stay queued.
    pub failed: u32,
    /// Entries whose operation was already applied by an earlier attempt.
    pub skipped: u32,
}

impl DrainReport {
    /// Total entries the drain handled.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.replayed + self.failed + self.skipped
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: &Self) {
        self.replayed += other.replayed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// How a single entry replay concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplayOutcome {
    /// The operation was applied to the store of record.
    Applied,
    /// The store of record already holds the operation's effect.
    AlreadyApplied,
}

/// Drains the offline queue into the store of record.
#[derive(Debug, Clone)]
pub struct SyncReconciler {
    queue: QueueRepository,
    ledger: LedgerRepository,
    installments: InstallmentRepository,
}

impl SyncReconciler {
    /// Creates a new reconciler over the given repositories.
    #[must_use]
    pub const fn new(
        queue: QueueRepository,
        ledger: LedgerRepository,
        installments: InstallmentRepository,
    ) -> Self {
        Self {
            queue,
            ledger,
            installments,
        }
    }

    /// Drains every queued entry for an owner.
    ///
    /// # Errors
    ///
    /// Returns an error only when the queue store itself fails; individual
    /// replay failures are counted in the report, not raised.
    pub async fn drain(&self, owner_id: Uuid) -> Result<DrainReport, QueueError> {
        let mut entries = self.queue.list_pending(owner_id).await?;
        entries.sort_by_key(|entry| (drain_rank(entry), entry.enqueued_at));

        let mut report = DrainReport::default();
        for entry in entries {
            match self.replay_entry(&entry).await {
                Ok(ReplayOutcome::Applied) => {
                    self.discard(entry.id).await?;
                    report.replayed += 1;
                }
                Ok(ReplayOutcome::AlreadyApplied) => {
                    self.discard(entry.id).await?;
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(
                        entry_id = %entry.id,
                        op_kind = %entry.op_kind,
                        entity_kind = %entry.entity_kind,
                        error = %e,
                        "Replay failed; entry stays queued"
                    );
                    match self.queue.mark_failed(entry.id, &e.to_string()).await {
                        Ok(()) | Err(QueueError::NotFound(_)) => {}
                        Err(mark_err) => return Err(mark_err),
                    }
                    report.failed += 1;
                }
            }
        }

        if report.total() > 0 {
            info!(
                owner_id = %owner_id,
                replayed = report.replayed,
                failed = report.failed,
                skipped = report.skipped,
                "Queue drain finished"
            );
        }

        Ok(report)
    }

    /// Drains the queues of every owner that has entries.
    ///
    /// # Errors
    ///
    /// Returns an error only when the queue store itself fails.
    pub async fn drain_all(&self) -> Result<DrainReport, QueueError> {
        let mut report = DrainReport::default();
        for owner_id in self.queue.pending_owners().await? {
            let owner_report = self.drain(owner_id).await?;
            report.merge(&owner_report);
        }

        Ok(report)
    }

    /// Replays one entry against the store of record.
    async fn replay_entry(
        &self,
        entry: &pending_operations::Model,
    ) -> Result<ReplayOutcome, SyncReplayError> {
        let payload = decode_payload(entry)?;
        let owner_id = entry.owner_id;
        // The entry id is the replay key; rows it creates carry it.
        let replay_key = entry.id;

        match payload {
            OfflinePayload::CreateExpense(draft) => {
                if self.transaction_replayed(owner_id, replay_key).await? {
                    return Ok(ReplayOutcome::AlreadyApplied);
                }
                let meta = TransactionMeta {
                    owner_id,
                    category_id: Some(draft.category_id.into_inner()),
                    date: draft.date,
                    notes: draft.notes,
                    installment_id: None,
                    replay_key: Some(replay_key),
                };
                self.ledger
                    .apply_debit(
                        draft.account_id.into_inner(),
                        draft.amount,
                        TransactionKind::Expense,
                        meta,
                    )
                    .await?;
                Ok(ReplayOutcome::Applied)
            }

            OfflinePayload::CreateIncome(draft) => {
                if self.transaction_replayed(owner_id, replay_key).await? {
                    return Ok(ReplayOutcome::AlreadyApplied);
                }
                let meta = TransactionMeta {
                    owner_id,
                    category_id: Some(draft.category_id.into_inner()),
                    date: draft.date,
                    notes: draft.notes,
                    installment_id: None,
                    replay_key: Some(replay_key),
                };
                self.ledger
                    .apply_credit(
                        draft.account_id.into_inner(),
                        draft.amount,
                        TransactionKind::Income,
                        meta,
                    )
                    .await?;
                Ok(ReplayOutcome::Applied)
            }

            OfflinePayload::CreateInstallment(draft) => {
                if self
                    .installments
                    .find_by_replay_key(owner_id, replay_key)
                    .await?
                    .is_some()
                {
                    return Ok(ReplayOutcome::AlreadyApplied);
                }
                self.installments
                    .create_installment(CreateInstallmentInput {
                        owner_id,
                        title: draft.title,
                        principal: draft.principal,
                        term_count: draft.term_count,
                        periodic_rate_percent: draft.periodic_rate_percent,
                        due_date: draft.due_date,
                        notes: draft.notes,
                        replay_key: Some(replay_key),
                    })
                    .await?;
                Ok(ReplayOutcome::Applied)
            }

            OfflinePayload::UpdateExpense(edit) | OfflinePayload::UpdateIncome(edit) => {
                // The replacement row an edit posts carries the replay key.
                if self.transaction_replayed(owner_id, replay_key).await? {
                    return Ok(ReplayOutcome::AlreadyApplied);
                }
                self.ledger
                    .reverse_and_reapply(
                        owner_id,
                        edit.transaction_id.into_inner(),
                        TransactionEditInput {
                            new_amount: edit.amount,
                            new_account_id: edit.account_id.into_inner(),
                            category_id: edit.category_id.map(CategoryId::into_inner),
                            notes: edit.notes,
                            replay_key: Some(replay_key),
                        },
                    )
                    .await?;
                Ok(ReplayOutcome::Applied)
            }

            OfflinePayload::UpdateInstallment(InstallmentUpdate::Edit(edit)) => {
                // Field edits carry absolute values; replaying one twice
                // converges, so no replay-key check is needed.
                self.installments
                    .update_installment(
                        owner_id,
                        edit.installment_id.into_inner(),
                        UpdateInstallmentInput {
                            title: edit.title,
                            due_date: edit.due_date,
                            notes: edit.notes,
                            principal: edit.principal,
                            term_count: edit.term_count,
                            periodic_rate_percent: edit.periodic_rate_percent,
                        },
                    )
                    .await?;
                Ok(ReplayOutcome::Applied)
            }

            OfflinePayload::UpdateInstallment(InstallmentUpdate::PayPeriods(draft)) => {
                // The payment's ledger row carries the replay key.
                if self.transaction_replayed(owner_id, replay_key).await? {
                    return Ok(ReplayOutcome::AlreadyApplied);
                }
                self.installments
                    .pay_periods(PayPeriodsInput {
                        owner_id,
                        installment_id: draft.installment_id.into_inner(),
                        periods_count: draft.periods_count,
                        account_id: draft.account_id.into_inner(),
                        date: draft.date,
                        notes: draft.notes,
                        replay_key: Some(replay_key),
                    })
                    .await?;
                Ok(ReplayOutcome::Applied)
            }

            OfflinePayload::DeleteExpense(target) | OfflinePayload::DeleteIncome(target) => {
                match self
                    .ledger
                    .reverse(owner_id, target.transaction_id.into_inner())
                    .await
                {
                    Ok(_) => Ok(ReplayOutcome::Applied),
                    // Already voided means the reversal took effect earlier.
                    Err(LedgerError::TransactionAlreadyVoided(_)) => {
                        Ok(ReplayOutcome::AlreadyApplied)
                    }
                    Err(e) => Err(e.into()),
                }
            }

            OfflinePayload::DeleteInstallment(target) => {
                match self
                    .installments
                    .delete_installment(owner_id, target.installment_id.into_inner())
                    .await
                {
                    Ok(()) => Ok(ReplayOutcome::Applied),
                    // The row is gone; a hard delete leaves nothing to redo.
                    Err(InstallmentError::NotFound(_)) => Ok(ReplayOutcome::AlreadyApplied),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Whether a ledger row created by this replay key already exists.
    async fn transaction_replayed(
        &self,
        owner_id: Uuid,
        replay_key: Uuid,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .ledger
            .find_by_replay_key(owner_id, replay_key)
            .await?
            .is_some())
    }

    /// Removes a drained entry, tolerating a concurrent drain having removed
    /// it first.
    async fn discard(&self, entry_id: Uuid) -> Result<(), QueueError> {
        match self.queue.remove(entry_id).await {
            Ok(()) | Err(QueueError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Sort key for draining: op-kind group first, enqueue order within.
///
/// An unparseable op kind sorts last; its payload will not decode either,
/// so the replay marks the entry failed instead of wedging the drain.
fn drain_rank(entry: &pending_operations::Model) -> u8 {
    entry
        .op_kind
        .parse::<OpKind>()
        .map_or(u8::MAX, OpKind::drain_rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::QueueEntryStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(op_kind: &str, offset_secs: i64) -> pending_operations::Model {
        let base = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        pending_operations::Model {
            id: Uuid::now_v7(),
            owner_id: Uuid::nil(),
            op_kind: op_kind.to_string(),
            entity_kind: "expense".to_string(),
            payload: String::new(),
            status: QueueEntryStatus::Pending,
            last_error: None,
            attempt_count: 0,
            enqueued_at: base + Duration::seconds(offset_secs),
            updated_at: base + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_drain_order_groups_creates_updates_deletes() {
        let mut entries = vec![
            entry("delete", 0),
            entry("update", 1),
            entry("create", 2),
            entry("create", 0),
        ];
        entries.sort_by_key(|e| (drain_rank(e), e.enqueued_at));

        let kinds: Vec<_> = entries.iter().map(|e| e.op_kind.as_str()).collect();
        assert_eq!(kinds, ["create", "create", "update", "delete"]);
        assert!(entries[0].enqueued_at < entries[1].enqueued_at);
    }

    #[test]
    fn test_unknown_op_kind_sorts_last() {
        let mut entries = vec![entry("upsert", 0), entry("delete", 5)];
        entries.sort_by_key(|e| (drain_rank(e), e.enqueued_at));

        assert_eq!(entries[1].op_kind, "upsert");
    }

    #[test]
    fn test_report_merge_totals() {
        let mut report = DrainReport {
            replayed: 2,
            failed: 1,
            skipped: 0,
        };
        report.merge(&DrainReport {
            replayed: 1,
            failed: 0,
            skipped: 3,
        });

        assert_eq!(report.replayed, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.total(), 7);
    }
}
