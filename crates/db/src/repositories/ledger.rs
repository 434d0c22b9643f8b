//! Ledger repository: the transaction manager for balance-mutating operations.
//!
//! Every public operation here is one atomic unit against the store of
//! record: the account balance is read inside the transactional scope, the
//! new balance comes from the pure arithmetic in `kasku_core::ledger`, and
//! the write carries an optimistic version guard. A guard miss rolls the unit
//! back and retries with fresh state; exhausting the attempt budget surfaces
//! `StoreConflict`. No operation ever leaves a partial write behind.

use chrono::{NaiveDate, Utc};
use kasku_core::ledger::{
    LedgerError, TransactionKind, TransactionStatus, credit_balance, debit_balance,
    edited_balance, restored_balance, validate_amount, validate_category,
    validate_transfer_accounts,
};
use kasku_shared::types::{AccountId, CategoryId, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    accounts,
    sea_orm_active_enums::{TransactionKind as StoredKind, TransactionStatus as StoredStatus},
    transactions,
};

/// How many times a version-guarded unit is retried before `StoreConflict`.
pub(crate) const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Reference fields shared by all transaction-creating operations.
#[derive(Debug, Clone)]
pub struct TransactionMeta {
    /// Owner the transaction belongs to.
    pub owner_id: Uuid,
    /// Category reference; required for expense and income kinds.
    pub category_id: Option<Uuid>,
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Link to the installment a payment row belongs to.
    pub installment_id: Option<Uuid>,
    /// Queue entry id when this row is created by a sync replay.
    pub replay_key: Option<Uuid>,
}

/// Receipt returned by a committed debit, credit, edit or reversal.
#[derive(Debug, Clone)]
pub struct LedgerReceipt {
    /// The transaction this receipt confirms. For an edit this is the
    /// freshly posted replacement row, not the voided original.
    pub transaction_id: Uuid,
    /// The account whose balance moved.
    pub account_id: Uuid,
    /// The account balance after commit.
    pub new_balance: Decimal,
}

/// Receipt returned by a committed transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    /// The outgoing (debit) row on the source account.
    pub out_transaction_id: Uuid,
    /// The incoming (credit) row on the destination account.
    pub in_transaction_id: Uuid,
    /// Source account balance after commit.
    pub from_balance: Decimal,
    /// Destination account balance after commit.
    pub to_balance: Decimal,
}

/// Input for the reverse-then-reapply edit flow.
#[derive(Debug, Clone)]
pub struct TransactionEditInput {
    /// Replacement amount (positive magnitude).
    pub new_amount: Decimal,
    /// Account the replacement row posts against; may equal the original.
    pub new_account_id: Uuid,
    /// Replacement category; the original row's category is kept when `None`.
    pub category_id: Option<Uuid>,
    /// Replacement notes; the original row's notes are kept when `None`.
    pub notes: Option<String>,
    /// Queue entry id when this edit is a sync replay.
    pub replay_key: Option<Uuid>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by account.
    pub account_id: Option<Uuid>,
    /// Filter by transaction kind.
    pub kind: Option<TransactionKind>,
    /// Filter by lifecycle status.
    pub status: Option<TransactionStatus>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
}

/// Ledger repository: the only writer of account balances.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a debit: balance decreases by `amount`, one transaction row
    /// is inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive, or the kind is not a non-transfer debit
    /// - A required category reference is missing
    /// - The account does not exist, is inactive, or cannot cover the amount
    /// - Concurrent writers keep winning the version guard (`StoreConflict`)
    pub async fn apply_debit(
        &self,
        account_id: Uuid,
        amount: Decimal,
        kind: TransactionKind,
        meta: TransactionMeta,
    ) -> Result<LedgerReceipt, LedgerError> {
        validate_amount(amount)?;
        if !kind.is_debit() {
            return Err(LedgerError::Validation(format!(
                "{kind} is not a debit kind"
            )));
        }
        if kind.requires_counterparty() {
            return Err(LedgerError::Validation(
                "transfers must go through apply_transfer".to_string(),
            ));
        }
        validate_category(kind, meta.category_id.map(CategoryId::from_uuid))?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            let account = find_account(&txn, meta.owner_id, account_id).await?;
            let new_balance = debit_balance(account.balance, amount)?;

            if !write_balance(&txn, &account, new_balance).await? {
                txn.rollback()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                continue;
            }

            let transaction_id =
                insert_transaction(&txn, account_id, amount, kind, None, &meta).await?;

            txn.commit()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            return Ok(LedgerReceipt {
                transaction_id,
                account_id,
                new_balance,
            });
        }

        Err(LedgerError::StoreConflict)
    }

    /// Applies a credit: balance increases by `amount`, one transaction row
    /// is inserted. Credits have no sufficiency check.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive, or the kind is not a non-transfer credit
    /// - A required category reference is missing
    /// - The account does not exist or is inactive
    /// - Concurrent writers keep winning the version guard (`StoreConflict`)
    pub async fn apply_credit(
        &self,
        account_id: Uuid,
        amount: Decimal,
        kind: TransactionKind,
        meta: TransactionMeta,
    ) -> Result<LedgerReceipt, LedgerError> {
        validate_amount(amount)?;
        if kind.is_debit() {
            return Err(LedgerError::Validation(format!(
                "{kind} is not a credit kind"
            )));
        }
        if kind.requires_counterparty() {
            return Err(LedgerError::Validation(
                "transfers must go through apply_transfer".to_string(),
            ));
        }
        validate_category(kind, meta.category_id.map(CategoryId::from_uuid))?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            let account = find_account(&txn, meta.owner_id, account_id).await?;
            let new_balance = credit_balance(account.balance, amount)?;

            if !write_balance(&txn, &account, new_balance).await? {
                txn.rollback()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                continue;
            }

            let transaction_id =
                insert_transaction(&txn, account_id, amount, kind, None, &meta).await?;

            txn.commit()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            return Ok(LedgerReceipt {
                transaction_id,
                account_id,
                new_balance,
            });
        }

        Err(LedgerError::StoreConflict)
    }

    /// Moves `amount` between two accounts as one atomic unit.
    ///
    /// Writes a transfer_out row on the source and a transfer_in row on the
    /// destination; both commit or neither does.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive
    /// - Source and destination are the same account
    /// - Either account does not exist or is inactive
    /// - The source cannot cover the amount
    /// - Concurrent writers keep winning the version guards (`StoreConflict`)
    pub async fn apply_transfer(
        &self,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount: Decimal,
        meta: TransactionMeta,
    ) -> Result<TransferReceipt, LedgerError> {
        validate_amount(amount)?;
        validate_transfer_accounts(
            AccountId::from_uuid(from_account_id),
            AccountId::from_uuid(to_account_id),
        )?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            let from = find_account(&txn, meta.owner_id, from_account_id).await?;
            let to = find_account(&txn, meta.owner_id, to_account_id).await?;

            let from_balance = debit_balance(from.balance, amount)?;
            let to_balance = credit_balance(to.balance, amount)?;

            if !write_balance(&txn, &from, from_balance).await?
                || !write_balance(&txn, &to, to_balance).await?
            {
                txn.rollback()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                continue;
            }

            let out_transaction_id = insert_transaction(
                &txn,
                from_account_id,
                amount,
                TransactionKind::TransferOut,
                Some(to_account_id),
                &meta,
            )
            .await?;

            // The replay key is unique per row; only the outgoing row carries it.
            let in_meta = TransactionMeta {
                replay_key: None,
                ..meta.clone()
            };
            let in_transaction_id = insert_transaction(
                &txn,
                to_account_id,
                amount,
                TransactionKind::TransferIn,
                Some(from_account_id),
                &in_meta,
            )
            .await?;

            txn.commit()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            return Ok(TransferReceipt {
                out_transaction_id,
                in_transaction_id,
                from_balance,
                to_balance,
            });
        }

        Err(LedgerError::StoreConflict)
    }

    /// Reverses a posted transaction: restores its balance effect exactly and
    /// marks the row voided.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The transaction does not exist for this owner
    /// - The transaction is already voided (reported distinctly; the sync
    ///   replay treats it as confirmation)
    /// - The kind does not support direct reversal
    /// - Concurrent writers keep winning the version guard (`StoreConflict`)
    pub async fn reverse(
        &self,
        owner_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<LedgerReceipt, LedgerError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            let row = find_transaction(&txn, owner_id, transaction_id).await?;
            if row.status == StoredStatus::Voided {
                return Err(LedgerError::TransactionAlreadyVoided(transaction_id));
            }

            let kind = TransactionKind::from(row.kind.clone());
            if !supports_reverse(kind) {
                return Err(LedgerError::Validation(format!(
                    "{kind} transactions cannot be reversed directly"
                )));
            }

            let account = find_account(&txn, owner_id, row.account_id).await?;
            let new_balance = restored_balance(kind, account.balance, row.amount);

            if !write_balance(&txn, &account, new_balance).await? {
                txn.rollback()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                continue;
            }
            if !mark_voided(&txn, transaction_id).await? {
                txn.rollback()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                continue;
            }

            txn.commit()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            return Ok(LedgerReceipt {
                transaction_id,
                account_id: row.account_id,
                new_balance,
            });
        }

        Err(LedgerError::StoreConflict)
    }

    /// Edits a posted transaction via the reverse-then-reapply flow.
    ///
    /// Restores the original row's balance effect, voids it, and posts a
    /// fresh row with the new amount and account, all within one atomic
    /// unit. The replacement keeps the original date, and its category and
    /// notes unless the input overrides them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The new amount is not positive
    /// - The transaction does not exist for this owner or is already voided
    /// - The kind does not support editing
    /// - A debit reapply would overdraw the target account
    /// - Concurrent writers keep winning the version guards (`StoreConflict`)
    pub async fn reverse_and_reapply(
        &self,
        owner_id: Uuid,
        transaction_id: Uuid,
        input: TransactionEditInput,
    ) -> Result<LedgerReceipt, LedgerError> {
        validate_amount(input.new_amount)?;

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            let row = find_transaction(&txn, owner_id, transaction_id).await?;
            if row.status == StoredStatus::Voided {
                return Err(LedgerError::TransactionAlreadyVoided(transaction_id));
            }

            let kind = TransactionKind::from(row.kind.clone());
            if !supports_reverse(kind) {
                return Err(LedgerError::Validation(format!(
                    "{kind} transactions cannot be edited"
                )));
            }

            let category_id = input.category_id.or(row.category_id);
            validate_category(kind, category_id.map(CategoryId::from_uuid))?;

            let meta = TransactionMeta {
                owner_id,
                category_id,
                date: row.date,
                notes: input.notes.clone().or_else(|| row.notes.clone()),
                installment_id: None,
                replay_key: input.replay_key,
            };

            let new_balance = if input.new_account_id == row.account_id {
                // Same account: restore and reapply collapse into one write.
                let account = find_account(&txn, owner_id, row.account_id).await?;
                let new_balance =
                    edited_balance(kind, account.balance, row.amount, input.new_amount)?;

                if !write_balance(&txn, &account, new_balance).await? {
                    txn.rollback()
                        .await
                        .map_err(|e| LedgerError::Database(e.to_string()))?;
                    continue;
                }
                new_balance
            } else {
                let old_account = find_account(&txn, owner_id, row.account_id).await?;
                let new_account = find_account(&txn, owner_id, input.new_account_id).await?;

                let restored = restored_balance(kind, old_account.balance, row.amount);
                let applied = if kind.is_debit() {
                    debit_balance(new_account.balance, input.new_amount)?
                } else {
                    credit_balance(new_account.balance, input.new_amount)?
                };

                if !write_balance(&txn, &old_account, restored).await?
                    || !write_balance(&txn, &new_account, applied).await?
                {
                    txn.rollback()
                        .await
                        .map_err(|e| LedgerError::Database(e.to_string()))?;
                    continue;
                }
                applied
            };

            if !mark_voided(&txn, transaction_id).await? {
                txn.rollback()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                continue;
            }

            let new_transaction_id =
                insert_transaction(&txn, input.new_account_id, input.new_amount, kind, None, &meta)
                    .await?;

            txn.commit()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            return Ok(LedgerReceipt {
                transaction_id: new_transaction_id,
                account_id: input.new_account_id,
                new_balance,
            });
        }

        Err(LedgerError::StoreConflict)
    }

    /// Gets a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction does not exist for this owner or
    /// the store query fails.
    pub async fn get_transaction(
        &self,
        owner_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<transactions::Model, LedgerError> {
        let row = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        Ok(row)
    }

    /// Looks up the transaction a sync replay created, by its replay key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn find_by_replay_key(
        &self,
        owner_id: Uuid,
        replay_key: Uuid,
    ) -> Result<Option<transactions::Model>, LedgerError> {
        let row = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .filter(transactions::Column::ReplayKey.eq(replay_key))
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(row)
    }

    /// Lists transactions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn list_transactions(
        &self,
        owner_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<transactions::Model>, LedgerError> {
        let mut query =
            transactions::Entity::find().filter(transactions::Column::OwnerId.eq(owner_id));

        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(StoredKind::from(kind)));
        }
        if let Some(status) = filter.status {
            query = query.filter(transactions::Column::Status.eq(StoredStatus::from(status)));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::Date.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::Date.lte(date_to));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let rows = query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }
}

// ============================================================================
// Transactional building blocks
//
// Shared with the installment repository so a period payment can run its
// ledger debit inside the same atomic unit as the progress update.
// ============================================================================

/// Loads an active account inside the transactional scope.
pub(crate) async fn find_account(
    txn: &DatabaseTransaction,
    owner_id: Uuid,
    account_id: Uuid,
) -> Result<accounts::Model, LedgerError> {
    let account = accounts::Entity::find_by_id(account_id)
        .filter(accounts::Column::OwnerId.eq(owner_id))
        .one(txn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?
        .ok_or(LedgerError::AccountNotFound(account_id))?;

    if !account.is_active {
        return Err(LedgerError::AccountInactive(account_id));
    }

    Ok(account)
}

/// Writes a new balance under the optimistic version guard.
///
/// Returns false when another writer committed first; the caller rolls the
/// unit back and retries with fresh state.
pub(crate) async fn write_balance(
    txn: &DatabaseTransaction,
    account: &accounts::Model,
    new_balance: Decimal,
) -> Result<bool, LedgerError> {
    let result = accounts::Entity::update_many()
        .col_expr(accounts::Column::Balance, Expr::value(new_balance))
        .col_expr(accounts::Column::Version, Expr::value(account.version + 1))
        .col_expr(
            accounts::Column::UpdatedAt,
            Expr::value(Utc::now().fixed_offset()),
        )
        .filter(accounts::Column::Id.eq(account.id))
        .filter(accounts::Column::Version.eq(account.version))
        .exec(txn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

    Ok(result.rows_affected == 1)
}

/// Inserts a posted transaction row and returns its id.
pub(crate) async fn insert_transaction(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    amount: Decimal,
    kind: TransactionKind,
    counterparty_account_id: Option<Uuid>,
    meta: &TransactionMeta,
) -> Result<Uuid, LedgerError> {
    let now = Utc::now().into();
    let id = Uuid::now_v7();

    let row = transactions::ActiveModel {
        id: Set(id),
        owner_id: Set(meta.owner_id),
        account_id: Set(account_id),
        kind: Set(kind.into()),
        status: Set(StoredStatus::Posted),
        amount: Set(amount),
        counterparty_account_id: Set(counterparty_account_id),
        category_id: Set(meta.category_id),
        installment_id: Set(meta.installment_id),
        date: Set(meta.date),
        notes: Set(meta.notes.clone()),
        replay_key: Set(meta.replay_key),
        created_at: Set(now),
        updated_at: Set(now),
    };

    row.insert(txn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

    Ok(id)
}

/// Loads a transaction row inside the transactional scope.
async fn find_transaction(
    txn: &DatabaseTransaction,
    owner_id: Uuid,
    transaction_id: Uuid,
) -> Result<transactions::Model, LedgerError> {
    let row = transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::OwnerId.eq(owner_id))
        .one(txn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?
        .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

    Ok(row)
}

/// Flips a posted row to voided.
///
/// Guarded on the posted status: returns false when another writer voided
/// the row first, so the caller retries and reports the void distinctly.
async fn mark_voided(
    txn: &DatabaseTransaction,
    transaction_id: Uuid,
) -> Result<bool, LedgerError> {
    let result = transactions::Entity::update_many()
        .col_expr(
            transactions::Column::Status,
            StoredStatus::Voided.as_enum(),
        )
        .col_expr(
            transactions::Column::UpdatedAt,
            Expr::value(Utc::now().fixed_offset()),
        )
        .filter(transactions::Column::Id.eq(transaction_id))
        .filter(transactions::Column::Status.eq(StoredStatus::Posted))
        .exec(txn)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

    Ok(result.rows_affected == 1)
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Whether a kind supports the direct reverse flows.
///
/// Transfer legs and installment payments are excluded: their balance
/// effects pair with sibling rows managed by their parent operations.
#[must_use]
pub const fn supports_reverse(kind: TransactionKind) -> bool {
    matches!(kind, TransactionKind::Expense | TransactionKind::Income)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_and_income_support_reverse() {
        assert!(supports_reverse(TransactionKind::Expense));
        assert!(supports_reverse(TransactionKind::Income));
    }

    #[test]
    fn test_paired_kinds_do_not_support_reverse() {
        assert!(!supports_reverse(TransactionKind::TransferOut));
        assert!(!supports_reverse(TransactionKind::TransferIn));
        assert!(!supports_reverse(TransactionKind::InstallmentPayment));
    }

    #[test]
    fn test_filter_default_is_unfiltered() {
        let filter = TransactionFilter::default();
        assert!(filter.account_id.is_none());
        assert!(filter.kind.is_none());
        assert!(filter.status.is_none());
        assert!(filter.date_from.is_none());
        assert!(filter.date_to.is_none());
    }
}
