//! Installment repository: plans, progress accounting and period payments.
//!
//! Only the schedule inputs (principal, term count, periodic rate) and the
//! progress fields are persisted; the schedule itself is recomputed on every
//! read so progress accounting always works with the unrounded period
//! amount. A period payment composes the ledger debit and the progress
//! update into one atomic unit via the ledger's transactional building
//! blocks, under the same version-guard retry discipline.

use chrono::{NaiveDate, Utc};
use kasku_core::installment::{
    EffectiveStatus, InstallmentError, InstallmentStatus, PaymentPlan, Schedule, compute_schedule,
    effective_status,
};
use kasku_core::ledger::{LedgerError, TransactionKind, debit_balance};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    installment_payments, installments,
    sea_orm_active_enums::InstallmentStatus as StoredInstallmentStatus,
};
use crate::repositories::ledger::{self, MAX_WRITE_ATTEMPTS, TransactionMeta};

/// Input for creating an installment plan.
#[derive(Debug, Clone)]
pub struct CreateInstallmentInput {
    /// Owner the installment belongs to.
    pub owner_id: Uuid,
    /// Display title.
    pub title: String,
    /// Borrowed amount, before interest.
    pub principal: Decimal,
    /// Total number of periods.
    pub term_count: u32,
    /// Flat interest rate per period, in percent. Zero is interest-free.
    pub periodic_rate_percent: Decimal,
    /// Date the whole installment is due.
    pub due_date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Queue entry id when this create is a sync replay.
    pub replay_key: Option<Uuid>,
}

/// Input for paying one or more periods of an installment.
#[derive(Debug, Clone)]
pub struct PayPeriodsInput {
    /// Owner the installment belongs to.
    pub owner_id: Uuid,
    /// The installment being paid.
    pub installment_id: Uuid,
    /// Periods to pay; clamped to the periods remaining.
    pub periods_count: u32,
    /// Account the payment debits.
    pub account_id: Uuid,
    /// Payment date.
    pub date: NaiveDate,
    /// Free-form notes for the ledger row.
    pub notes: Option<String>,
    /// Queue entry id when this payment is a sync replay.
    pub replay_key: Option<Uuid>,
}

/// Input for updating an installment. `None` fields are left unchanged.
///
/// Principal, term count and rate can only change before the first payment;
/// afterwards the recorded progress would no longer match the schedule.
#[derive(Debug, Clone, Default)]
pub struct UpdateInstallmentInput {
    /// New title.
    pub title: Option<String>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New notes.
    pub notes: Option<String>,
    /// New principal.
    pub principal: Option<Decimal>,
    /// New term count.
    pub term_count: Option<u32>,
    /// New periodic rate.
    pub periodic_rate_percent: Option<Decimal>,
}

/// Filter options for listing installments.
#[derive(Debug, Clone, Default)]
pub struct InstallmentFilter {
    /// Filter by presented status. `Overdue` selects active installments
    /// past their due date.
    pub status: Option<EffectiveStatus>,
}

/// An installment row together with its derived read-time state.
#[derive(Debug, Clone, Serialize)]
pub struct InstallmentSnapshot {
    /// The stored row.
    pub installment: installments::Model,
    /// Schedule recomputed from the stored inputs.
    pub schedule: Schedule,
    /// Status as presented to callers, overdue included.
    pub effective_status: EffectiveStatus,
}

/// Receipt returned by a committed period payment.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// The single ledger transaction covering all paid periods.
    pub transaction_id: Uuid,
    /// Balance of the paying account after commit.
    pub account_new_balance: Decimal,
    /// Periods paid so far, after this payment.
    pub paid_periods: u32,
    /// Cumulative amount paid, after this payment.
    pub total_paid: Decimal,
    /// Amount still owed; exactly zero when completed.
    pub remaining_amount: Decimal,
    /// True when this payment paid the final period.
    pub completed: bool,
}

/// Installment repository.
#[derive(Debug, Clone)]
pub struct InstallmentRepository {
    db: DatabaseConnection,
}

impl InstallmentRepository {
    /// Creates a new installment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an installment plan with zeroed progress.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The title is empty or whitespace
    /// - The schedule inputs are invalid (non-positive principal or term,
    ///   negative rate)
    /// - The store insert fails
    pub async fn create_installment(
        &self,
        input: CreateInstallmentInput,
    ) -> Result<InstallmentSnapshot, InstallmentError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(InstallmentError::Validation(
                "installment title cannot be empty".to_string(),
            ));
        }

        let schedule =
            compute_schedule(input.principal, input.term_count, input.periodic_rate_percent)?;

        let now = Utc::now().into();
        let row = installments::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(input.owner_id),
            title: Set(title.to_string()),
            principal: Set(input.principal),
            term_count: Set(stored_periods(input.term_count)?),
            periodic_rate_percent: Set(input.periodic_rate_percent),
            due_date: Set(input.due_date),
            paid_periods: Set(0),
            total_paid: Set(Decimal::ZERO),
            remaining_amount: Set(schedule.total_with_interest),
            status: Set(StoredInstallmentStatus::Active),
            notes: Set(input.notes),
            replay_key: Set(input.replay_key),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = row
            .insert(&self.db)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;

        snapshot(model)
    }

    /// Gets an installment with its recomputed schedule and derived status.
    ///
    /// # Errors
    ///
    /// Returns an error if the installment does not exist for this owner or
    /// the store query fails.
    pub async fn get_installment(
        &self,
        owner_id: Uuid,
        installment_id: Uuid,
    ) -> Result<InstallmentSnapshot, InstallmentError> {
        let row = installments::Entity::find_by_id(installment_id)
            .filter(installments::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?
            .ok_or(InstallmentError::NotFound(installment_id))?;

        snapshot(row)
    }

    /// Lists installments for an owner, soonest due date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn list_installments(
        &self,
        owner_id: Uuid,
        filter: InstallmentFilter,
    ) -> Result<Vec<InstallmentSnapshot>, InstallmentError> {
        let mut query =
            installments::Entity::find().filter(installments::Column::OwnerId.eq(owner_id));

        // Overdue is derived, not stored: narrow to the stored status first,
        // then filter on the snapshot.
        if let Some(status) = filter.status {
            let stored = match status {
                EffectiveStatus::Completed => StoredInstallmentStatus::Completed,
                EffectiveStatus::Active | EffectiveStatus::Overdue => {
                    StoredInstallmentStatus::Active
                }
            };
            query = query.filter(installments::Column::Status.eq(stored));
        }

        let rows = query
            .order_by_asc(installments::Column::DueDate)
            .order_by_asc(installments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;

        let snapshots = rows
            .into_iter()
            .map(snapshot)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match filter.status {
            Some(wanted) => snapshots
                .into_iter()
                .filter(|s| s.effective_status == wanted)
                .collect(),
            None => snapshots,
        })
    }

    /// Pays one or more periods: debits the account, posts one ledger row
    /// covering all paid periods, advances the progress fields and records
    /// one payment row per period, all within one atomic unit.
    ///
    /// The requested count is clamped to the periods remaining, so paying
    /// off early is a request for at least the remaining count.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The installment does not exist for this owner
    /// - The installment is already completed
    /// - The requested period count is zero
    /// - The account does not exist, is inactive, or cannot cover the amount
    /// - Concurrent writers keep winning the version guards (`StoreConflict`)
    pub async fn pay_periods(
        &self,
        input: PayPeriodsInput,
    ) -> Result<PaymentReceipt, InstallmentError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| InstallmentError::Database(e.to_string()))?;

            let row = find_installment(&txn, input.owner_id, input.installment_id).await?;
            let stored = InstallmentStatus::from(row.status.clone());
            if !stored.accepts_payments() {
                return Err(InstallmentError::AlreadyCompleted);
            }

            let term_count = loaded_periods(row.term_count)?;
            let paid_periods = loaded_periods(row.paid_periods)?;
            let schedule = compute_schedule(row.principal, term_count, row.periodic_rate_percent)?;
            let plan = PaymentPlan::build(
                &schedule,
                term_count,
                paid_periods,
                row.total_paid,
                input.periods_count,
            )?;

            let account = ledger::find_account(&txn, input.owner_id, input.account_id).await?;
            let new_balance = debit_balance(account.balance, plan.payment_amount)?;

            if !ledger::write_balance(&txn, &account, new_balance).await? {
                txn.rollback()
                    .await
                    .map_err(|e| InstallmentError::Database(e.to_string()))?;
                continue;
            }

            let meta = TransactionMeta {
                owner_id: input.owner_id,
                category_id: None,
                date: input.date,
                notes: input.notes.clone(),
                installment_id: Some(row.id),
                replay_key: input.replay_key,
            };
            let transaction_id = ledger::insert_transaction(
                &txn,
                input.account_id,
                plan.payment_amount,
                TransactionKind::InstallmentPayment,
                None,
                &meta,
            )
            .await?;

            if !write_progress(&txn, &row, &plan).await? {
                txn.rollback()
                    .await
                    .map_err(|e| InstallmentError::Database(e.to_string()))?;
                continue;
            }

            for period in plan.period_numbers() {
                let payment = installment_payments::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    installment_id: Set(row.id),
                    period_number: Set(stored_periods(period)?),
                    amount: Set(schedule.period_amount),
                    date: Set(input.date),
                    account_id: Set(input.account_id),
                    transaction_id: Set(transaction_id),
                    created_at: Set(Utc::now().into()),
                };
                payment
                    .insert(&txn)
                    .await
                    .map_err(|e| InstallmentError::Database(e.to_string()))?;
            }

            txn.commit()
                .await
                .map_err(|e| InstallmentError::Database(e.to_string()))?;

            return Ok(PaymentReceipt {
                transaction_id,
                account_new_balance: new_balance,
                paid_periods: plan.new_paid_periods,
                total_paid: plan.new_total_paid,
                remaining_amount: plan.new_remaining,
                completed: plan.completes,
            });
        }

        Err(LedgerError::StoreConflict.into())
    }

    /// Updates an installment. Title, due date and notes can change at any
    /// time; principal, term count and rate only before the first payment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The installment does not exist for this owner
    /// - A schedule field changes after a payment was recorded
    /// - The new title is empty, or the new schedule inputs are invalid
    /// - Concurrent writers keep winning the version guard (`StoreConflict`)
    pub async fn update_installment(
        &self,
        owner_id: Uuid,
        installment_id: Uuid,
        input: UpdateInstallmentInput,
    ) -> Result<InstallmentSnapshot, InstallmentError> {
        let title = match &input.title {
            Some(t) => {
                let trimmed = t.trim();
                if trimmed.is_empty() {
                    return Err(InstallmentError::Validation(
                        "installment title cannot be empty".to_string(),
                    ));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };
        let edits_schedule = input.principal.is_some()
            || input.term_count.is_some()
            || input.periodic_rate_percent.is_some();

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| InstallmentError::Database(e.to_string()))?;

            let row = find_installment(&txn, owner_id, installment_id).await?;
            if edits_schedule && row.paid_periods > 0 {
                return Err(InstallmentError::Validation(
                    "schedule fields can only change before the first payment".to_string(),
                ));
            }

            let mut update = installments::Entity::update_many()
                .col_expr(installments::Column::Version, Expr::value(row.version + 1))
                .col_expr(
                    installments::Column::UpdatedAt,
                    Expr::value(Utc::now().fixed_offset()),
                );

            if let Some(title) = &title {
                update = update.col_expr(installments::Column::Title, Expr::value(title.clone()));
            }
            if let Some(due_date) = input.due_date {
                update = update.col_expr(installments::Column::DueDate, Expr::value(due_date));
            }
            if let Some(notes) = &input.notes {
                update = update.col_expr(installments::Column::Notes, Expr::value(notes.clone()));
            }
            if edits_schedule {
                let principal = input.principal.unwrap_or(row.principal);
                let term_count = match input.term_count {
                    Some(t) => t,
                    None => loaded_periods(row.term_count)?,
                };
                let rate = input
                    .periodic_rate_percent
                    .unwrap_or(row.periodic_rate_percent);
                let schedule = compute_schedule(principal, term_count, rate)?;

                update = update
                    .col_expr(installments::Column::Principal, Expr::value(principal))
                    .col_expr(
                        installments::Column::TermCount,
                        Expr::value(stored_periods(term_count)?),
                    )
                    .col_expr(
                        installments::Column::PeriodicRatePercent,
                        Expr::value(rate),
                    )
                    .col_expr(
                        installments::Column::RemainingAmount,
                        Expr::value(schedule.total_with_interest),
                    );
            }

            let result = update
                .filter(installments::Column::Id.eq(installment_id))
                .filter(installments::Column::Version.eq(row.version))
                .exec(&txn)
                .await
                .map_err(|e| InstallmentError::Database(e.to_string()))?;

            if result.rows_affected == 0 {
                txn.rollback()
                    .await
                    .map_err(|e| InstallmentError::Database(e.to_string()))?;
                continue;
            }

            txn.commit()
                .await
                .map_err(|e| InstallmentError::Database(e.to_string()))?;

            return self.get_installment(owner_id, installment_id).await;
        }

        Err(LedgerError::StoreConflict.into())
    }

    /// Deletes an installment that has no recorded payments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The installment does not exist for this owner
    /// - Payments are recorded against it; the ledger history must keep its
    ///   referent
    pub async fn delete_installment(
        &self,
        owner_id: Uuid,
        installment_id: Uuid,
    ) -> Result<(), InstallmentError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;

        let row = find_installment(&txn, owner_id, installment_id).await?;

        let payments = installment_payments::Entity::find()
            .filter(installment_payments::Column::InstallmentId.eq(row.id))
            .count(&txn)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;
        if payments > 0 {
            return Err(InstallmentError::Validation(
                "installments with recorded payments cannot be deleted".to_string(),
            ));
        }

        installments::Entity::delete_by_id(row.id)
            .exec(&txn)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;

        Ok(())
    }

    /// Lists the recorded payments of an installment, in period order.
    ///
    /// # Errors
    ///
    /// Returns an error if the installment does not exist for this owner or
    /// the store query fails.
    pub async fn list_payments(
        &self,
        owner_id: Uuid,
        installment_id: Uuid,
    ) -> Result<Vec<installment_payments::Model>, InstallmentError> {
        // Ownership travels through the parent row.
        let installment = installments::Entity::find_by_id(installment_id)
            .filter(installments::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?
            .ok_or(InstallmentError::NotFound(installment_id))?;

        let rows = installment_payments::Entity::find()
            .filter(installment_payments::Column::InstallmentId.eq(installment.id))
            .order_by_asc(installment_payments::Column::PeriodNumber)
            .all(&self.db)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;

        Ok(rows)
    }

    /// Looks up the installment a sync replay created, by its replay key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn find_by_replay_key(
        &self,
        owner_id: Uuid,
        replay_key: Uuid,
    ) -> Result<Option<installments::Model>, InstallmentError> {
        let row = installments::Entity::find()
            .filter(installments::Column::OwnerId.eq(owner_id))
            .filter(installments::Column::ReplayKey.eq(replay_key))
            .one(&self.db)
            .await
            .map_err(|e| InstallmentError::Database(e.to_string()))?;

        Ok(row)
    }
}

// ============================================================================
// Transactional helpers
// ============================================================================

/// Loads an installment row inside the transactional scope.
async fn find_installment(
    txn: &DatabaseTransaction,
    owner_id: Uuid,
    installment_id: Uuid,
) -> Result<installments::Model, InstallmentError> {
    installments::Entity::find_by_id(installment_id)
        .filter(installments::Column::OwnerId.eq(owner_id))
        .one(txn)
        .await
        .map_err(|e| InstallmentError::Database(e.to_string()))?
        .ok_or(InstallmentError::NotFound(installment_id))
}

/// Writes the post-payment progress fields under the optimistic version
/// guard. Returns false when another writer committed first.
async fn write_progress(
    txn: &DatabaseTransaction,
    installment: &installments::Model,
    plan: &PaymentPlan,
) -> Result<bool, InstallmentError> {
    let status = if plan.completes {
        StoredInstallmentStatus::Completed
    } else {
        StoredInstallmentStatus::Active
    };

    let result = installments::Entity::update_many()
        .col_expr(
            installments::Column::PaidPeriods,
            Expr::value(stored_periods(plan.new_paid_periods)?),
        )
        .col_expr(
            installments::Column::TotalPaid,
            Expr::value(plan.new_total_paid),
        )
        .col_expr(
            installments::Column::RemainingAmount,
            Expr::value(plan.new_remaining),
        )
        .col_expr(installments::Column::Status, status.as_enum())
        .col_expr(
            installments::Column::Version,
            Expr::value(installment.version + 1),
        )
        .col_expr(
            installments::Column::UpdatedAt,
            Expr::value(Utc::now().fixed_offset()),
        )
        .filter(installments::Column::Id.eq(installment.id))
        .filter(installments::Column::Version.eq(installment.version))
        .exec(txn)
        .await
        .map_err(|e| InstallmentError::Database(e.to_string()))?;

    Ok(result.rows_affected == 1)
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Builds the read-time view of a stored row: recomputed schedule plus the
/// derived status.
fn snapshot(row: installments::Model) -> Result<InstallmentSnapshot, InstallmentError> {
    let term_count = loaded_periods(row.term_count)?;
    let schedule = compute_schedule(row.principal, term_count, row.periodic_rate_percent)?;
    let stored = InstallmentStatus::from(row.status.clone());
    let effective = effective_status(stored, row.due_date, Utc::now().date_naive());

    Ok(InstallmentSnapshot {
        installment: row,
        schedule,
        effective_status: effective,
    })
}

/// Converts a period count to its stored form.
fn stored_periods(value: u32) -> Result<i32, InstallmentError> {
    i32::try_from(value)
        .map_err(|_| InstallmentError::Validation(format!("period count out of range: {value}")))
}

/// Converts a stored period count back to the domain form.
fn loaded_periods(value: i32) -> Result<u32, InstallmentError> {
    u32::try_from(value).map_err(|_| {
        InstallmentError::Database(format!("negative period count in store: {value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_count_round_trip() {
        assert_eq!(stored_periods(12).unwrap(), 12);
        assert_eq!(loaded_periods(12).unwrap(), 12);
        assert_eq!(loaded_periods(stored_periods(360).unwrap()).unwrap(), 360);
    }

    #[test]
    fn test_oversized_period_count_rejected() {
        assert!(matches!(
            stored_periods(u32::MAX),
            Err(InstallmentError::Validation(_))
        ));
    }

    #[test]
    fn test_negative_stored_period_count_rejected() {
        assert!(matches!(
            loaded_periods(-1),
            Err(InstallmentError::Database(_))
        ));
    }

    #[test]
    fn test_filter_default_is_unfiltered() {
        assert!(InstallmentFilter::default().status.is_none());
    }
}
