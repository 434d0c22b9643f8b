//! Account repository for money account database operations.
//!
//! Accounts are created and renamed here, but their balances are not:
//! every balance write goes through the ledger repository. Deleting an
//! account deactivates it when committed history exists and removes the
//! row outright otherwise.

use kasku_core::ledger::LedgerError;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{accounts, sea_orm_active_enums::AccountKind, transactions};

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountDeletion {
    /// The account had committed transactions and was deactivated.
    Deactivated,
    /// The account had no history and its row was removed.
    Removed,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owner the account belongs to.
    pub owner_id: Uuid,
    /// Display name (must be unique per owner).
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Opening balance. Signed; a credit account may start negative.
    pub initial_balance: Decimal,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New display name.
    pub name: Option<String>,
    /// New account kind (only while the account has no transactions).
    pub kind: Option<AccountKind>,
    /// Active flag; `Some(true)` reactivates a deactivated account.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account kind.
    pub kind: Option<AccountKind>,
    /// Include deactivated accounts in the listing.
    pub include_inactive: bool,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty
    /// - The owner already has an account with this name
    /// - The store operation fails
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, LedgerError> {
        validate_account_name(&input.name)?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(input.owner_id))
            .filter(accounts::Column::Name.eq(&input.name))
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(LedgerError::Validation(format!(
                "Account name '{}' already exists",
                input.name
            )));
        }

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(input.owner_id),
            name: Set(input.name),
            kind: Set(input.kind),
            balance: Set(input.initial_balance),
            is_active: Set(true),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account
            .insert(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(account)
    }

    /// Finds an account by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist for this owner or the
    /// store query fails.
    pub async fn get_account(
        &self,
        owner_id: Uuid,
        account_id: Uuid,
    ) -> Result<accounts::Model, LedgerError> {
        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        Ok(account)
    }

    /// Lists accounts for an owner, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn list_accounts(
        &self,
        owner_id: Uuid,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, LedgerError> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(owner_id))
            .order_by_asc(accounts::Column::Name);

        if let Some(kind) = filter.kind {
            query = query.filter(accounts::Column::Kind.eq(kind));
        }

        if !filter.include_inactive {
            query = query.filter(accounts::Column::IsActive.eq(true));
        }

        let accounts = query
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(accounts)
    }

    /// Updates an account with validation.
    ///
    /// Balance and version are never touched here; those belong to the
    /// ledger repository.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist for this owner
    /// - The new name is empty or already taken
    /// - The kind changes while transactions reference the account
    /// - The store operation fails
    pub async fn update_account(
        &self,
        owner_id: Uuid,
        account_id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, LedgerError> {
        let account = self.get_account(owner_id, account_id).await?;

        if let Some(new_name) = &input.name
            && *new_name != account.name
        {
            validate_account_name(new_name)?;

            let existing = accounts::Entity::find()
                .filter(accounts::Column::OwnerId.eq(owner_id))
                .filter(accounts::Column::Name.eq(new_name))
                .filter(accounts::Column::Id.ne(account_id))
                .one(&self.db)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            if existing.is_some() {
                return Err(LedgerError::Validation(format!(
                    "Account name '{new_name}' already exists"
                )));
            }
        }

        if let Some(new_kind) = &input.kind
            && *new_kind != account.kind
        {
            let history = self.count_transactions(account_id).await?;
            if history > 0 {
                return Err(LedgerError::Validation(format!(
                    "Cannot change account kind: account has {history} transactions"
                )));
            }
        }

        let now = chrono::Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now);

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(updated)
    }

    /// Deletes an account.
    ///
    /// With committed transactions the account is deactivated so history
    /// stays intact; without any it is removed outright.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist for this owner or the
    /// store operation fails.
    pub async fn delete_account(
        &self,
        owner_id: Uuid,
        account_id: Uuid,
    ) -> Result<AccountDeletion, LedgerError> {
        let account = self.get_account(owner_id, account_id).await?;

        let history = self.count_transactions(account_id).await?;
        match deletion_mode(history) {
            AccountDeletion::Removed => {
                accounts::Entity::delete_by_id(account_id)
                    .exec(&self.db)
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                Ok(AccountDeletion::Removed)
            }
            AccountDeletion::Deactivated => {
                let now = chrono::Utc::now().into();
                let mut active: accounts::ActiveModel = account.into();
                active.is_active = Set(false);
                active.updated_at = Set(now);
                active
                    .update(&self.db)
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                Ok(AccountDeletion::Deactivated)
            }
        }
    }

    /// Counts transactions referencing an account.
    async fn count_transactions(&self, account_id: Uuid) -> Result<u64, LedgerError> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(count)
    }
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Validates an account display name.
pub fn validate_account_name(name: &str) -> Result<(), LedgerError> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Decides between deactivation and removal for an account with
/// `history_count` committed transactions.
#[must_use]
pub const fn deletion_mode(history_count: u64) -> AccountDeletion {
    if history_count == 0 {
        AccountDeletion::Removed
    } else {
        AccountDeletion::Deactivated
    }
}
