//! Money account routes.
//!
//! Balances are read-only here; every balance mutation goes through the
//! ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::{error_response, ledger_error_response};
use kasku_core::ledger::AccountKind;
use kasku_db::entities::accounts;
use kasku_db::entities::sea_orm_active_enums::AccountKind as StoredAccountKind;
use kasku_db::repositories::{
    AccountDeletion, AccountFilter, AccountRepository, CreateAccountInput, UpdateAccountInput,
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/owners/{owner_id}/accounts", get(list_accounts))
        .route("/owners/{owner_id}/accounts", post(create_account))
        .route("/owners/{owner_id}/accounts/{account_id}", get(get_account))
        .route(
            "/owners/{owner_id}/accounts/{account_id}",
            patch(update_account),
        )
        .route(
            "/owners/{owner_id}/accounts/{account_id}",
            delete(delete_account),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by account kind.
    pub kind: Option<String>,
    /// Include deactivated accounts.
    #[serde(default)]
    pub include_inactive: bool,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name, unique per owner.
    pub name: String,
    /// Account kind (bank, cash, credit, investment, e_wallet).
    pub kind: String,
    /// Opening balance; defaults to zero.
    #[serde(default)]
    pub initial_balance: Decimal,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New display name.
    pub name: Option<String>,
    /// New account kind (only while no transactions reference the account).
    pub kind: Option<String>,
    /// Active flag; `true` reactivates a deactivated account.
    pub is_active: Option<bool>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Account kind.
    pub kind: String,
    /// Current balance.
    pub balance: Decimal,
    /// Whether the account accepts new transactions.
    pub is_active: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: AccountKind::from(model.kind).to_string(),
            balance: model.balance,
            is_active: model.is_active,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/owners/{owner_id}/accounts` - List accounts.
async fn list_accounts(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<ListAccountsQuery>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    let filter = AccountFilter {
        kind: query
            .kind
            .as_deref()
            .and_then(|s| AccountKind::from_str(s).ok())
            .map(StoredAccountKind::from),
        include_inactive: query.include_inactive,
    };

    match repo.list_accounts(owner_id, filter).await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> =
                accounts.into_iter().map(AccountResponse::from).collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list accounts");
            ledger_error_response(&e)
        }
    }
}

/// POST `/owners/{owner_id}/accounts` - Create a new account.
async fn create_account(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let Ok(kind) = AccountKind::from_str(&payload.kind) else {
        return error_response(
            400,
            "INVALID_ACCOUNT_KIND",
            &format!("Unknown account kind: {}", payload.kind),
        );
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo
        .create_account(CreateAccountInput {
            owner_id,
            name: payload.name,
            kind: StoredAccountKind::from(kind),
            initial_balance: payload.initial_balance,
        })
        .await
    {
        Ok(account) => {
            info!(owner_id = %owner_id, account_id = %account.id, "Account created");
            (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create account");
            ledger_error_response(&e)
        }
    }
}

/// GET `/owners/{owner_id}/accounts/{account_id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    Path((owner_id, account_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.get_account(owner_id, account_id).await {
        Ok(account) => (StatusCode::OK, Json(AccountResponse::from(account))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get account");
            ledger_error_response(&e)
        }
    }
}

/// PATCH `/owners/{owner_id}/accounts/{account_id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    Path((owner_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    let kind = match payload.kind.as_deref() {
        None => None,
        Some(raw) => match AccountKind::from_str(raw) {
            Ok(kind) => Some(StoredAccountKind::from(kind)),
            Err(_) => {
                return error_response(
                    400,
                    "INVALID_ACCOUNT_KIND",
                    &format!("Unknown account kind: {raw}"),
                );
            }
        },
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo
        .update_account(
            owner_id,
            account_id,
            UpdateAccountInput {
                name: payload.name,
                kind,
                is_active: payload.is_active,
            },
        )
        .await
    {
        Ok(account) => {
            info!(owner_id = %owner_id, account_id = %account_id, "Account updated");
            (StatusCode::OK, Json(AccountResponse::from(account))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update account");
            ledger_error_response(&e)
        }
    }
}

/// DELETE `/owners/{owner_id}/accounts/{account_id}` - Delete an account.
///
/// Accounts with committed history are deactivated so their transactions
/// stay reconstructible; empty accounts are removed outright.
async fn delete_account(
    State(state): State<AppState>,
    Path((owner_id, account_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.delete_account(owner_id, account_id).await {
        Ok(outcome) => {
            let result = match outcome {
                AccountDeletion::Removed => "removed",
                AccountDeletion::Deactivated => "deactivated",
            };
            info!(owner_id = %owner_id, account_id = %account_id, result, "Account deleted");
            (StatusCode::OK, Json(json!({ "result": result }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete account");
            ledger_error_response(&e)
        }
    }
}
