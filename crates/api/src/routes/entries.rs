//! Expense and income routes.
//!
//! Both kinds share one set of handlers; the route decides the direction
//! and the ledger repository enforces the balance rules. Edits never
//! mutate a posted row: the original is voided and a replacement posted
//! in the same store transaction.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::ledger_error_response;
use kasku_core::events::LedgerEvent;
use kasku_core::ledger::{LedgerError, TransactionKind};
use kasku_db::repositories::{LedgerRepository, TransactionEditInput, TransactionMeta};
use kasku_shared::types::{AccountId, OwnerId, TransactionId};

/// Creates the expense and income routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/owners/{owner_id}/expenses", post(create_expense))
        .route(
            "/owners/{owner_id}/expenses/{transaction_id}",
            patch(edit_expense),
        )
        .route(
            "/owners/{owner_id}/expenses/{transaction_id}",
            delete(delete_expense),
        )
        .route("/owners/{owner_id}/incomes", post(create_income))
        .route(
            "/owners/{owner_id}/incomes/{transaction_id}",
            patch(edit_income),
        )
        .route(
            "/owners/{owner_id}/incomes/{transaction_id}",
            delete(delete_income),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording an expense or income.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Account the entry posts against.
    pub account_id: Uuid,
    /// Category the entry belongs to.
    pub category_id: Uuid,
    /// Positive amount.
    pub amount: Decimal,
    /// Entry date.
    pub date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for editing an expense or income.
#[derive(Debug, Deserialize)]
pub struct EditEntryRequest {
    /// Replacement amount.
    pub amount: Decimal,
    /// Account the replacement posts against; may equal the original.
    pub account_id: Uuid,
    /// Replacement category; the original is kept when omitted.
    pub category_id: Option<Uuid>,
    /// Replacement notes; the original is kept when omitted.
    pub notes: Option<String>,
}

/// Receipt for a committed entry mutation.
#[derive(Debug, Serialize)]
pub struct EntryReceiptResponse {
    /// The affected transaction. For an edit this is the replacement row.
    pub transaction_id: Uuid,
    /// The account whose balance moved.
    pub account_id: Uuid,
    /// Balance after commit.
    pub new_balance: Decimal,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/owners/{owner_id}/expenses` - Record an expense.
async fn create_expense(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    post_entry(&state, owner_id, TransactionKind::Expense, payload).await
}

/// POST `/owners/{owner_id}/incomes` - Record an income.
async fn create_income(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    post_entry(&state, owner_id, TransactionKind::Income, payload).await
}

/// PATCH `/owners/{owner_id}/expenses/{transaction_id}` - Edit an expense.
async fn edit_expense(
    State(state): State<AppState>,
    Path((owner_id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<EditEntryRequest>,
) -> impl IntoResponse {
    edit_entry(
        &state,
        owner_id,
        transaction_id,
        TransactionKind::Expense,
        payload,
    )
    .await
}

/// PATCH `/owners/{owner_id}/incomes/{transaction_id}` - Edit an income.
async fn edit_income(
    State(state): State<AppState>,
    Path((owner_id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<EditEntryRequest>,
) -> impl IntoResponse {
    edit_entry(
        &state,
        owner_id,
        transaction_id,
        TransactionKind::Income,
        payload,
    )
    .await
}

/// DELETE `/owners/{owner_id}/expenses/{transaction_id}` - Void an expense.
async fn delete_expense(
    State(state): State<AppState>,
    Path((owner_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    delete_entry(&state, owner_id, transaction_id, TransactionKind::Expense).await
}

/// DELETE `/owners/{owner_id}/incomes/{transaction_id}` - Void an income.
async fn delete_income(
    State(state): State<AppState>,
    Path((owner_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    delete_entry(&state, owner_id, transaction_id, TransactionKind::Income).await
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn post_entry(
    state: &AppState,
    owner_id: Uuid,
    kind: TransactionKind,
    payload: CreateEntryRequest,
) -> Response {
    let repo = LedgerRepository::new((*state.db).clone());

    let meta = TransactionMeta {
        owner_id,
        category_id: Some(payload.category_id),
        date: payload.date,
        notes: payload.notes,
        installment_id: None,
        replay_key: None,
    };

    let result = if kind.is_debit() {
        repo.apply_debit(payload.account_id, payload.amount, kind, meta)
            .await
    } else {
        repo.apply_credit(payload.account_id, payload.amount, kind, meta)
            .await
    };

    match result {
        Ok(receipt) => {
            info!(
                owner_id = %owner_id,
                transaction_id = %receipt.transaction_id,
                %kind,
                "Entry posted"
            );
            state.publish(LedgerEvent::TransactionPosted {
                owner_id: OwnerId::from_uuid(owner_id),
                transaction_id: TransactionId::from_uuid(receipt.transaction_id),
                account_id: AccountId::from_uuid(receipt.account_id),
                kind,
                amount: payload.amount,
                new_balance: receipt.new_balance,
            });
            (
                StatusCode::CREATED,
                Json(EntryReceiptResponse {
                    transaction_id: receipt.transaction_id,
                    account_id: receipt.account_id,
                    new_balance: receipt.new_balance,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, %kind, "Failed to post entry");
            ledger_error_response(&e)
        }
    }
}

async fn edit_entry(
    state: &AppState,
    owner_id: Uuid,
    transaction_id: Uuid,
    kind: TransactionKind,
    payload: EditEntryRequest,
) -> Response {
    let repo = LedgerRepository::new((*state.db).clone());

    if let Err(e) = ensure_entry_kind(&repo, owner_id, transaction_id, kind).await {
        error!(error = %e, "Failed to edit entry");
        return ledger_error_response(&e);
    }

    let input = TransactionEditInput {
        new_amount: payload.amount,
        new_account_id: payload.account_id,
        category_id: payload.category_id,
        notes: payload.notes,
        replay_key: None,
    };

    match repo.reverse_and_reapply(owner_id, transaction_id, input).await {
        Ok(receipt) => {
            info!(
                owner_id = %owner_id,
                original_id = %transaction_id,
                replacement_id = %receipt.transaction_id,
                "Entry edited"
            );
            state.publish(LedgerEvent::TransactionPosted {
                owner_id: OwnerId::from_uuid(owner_id),
                transaction_id: TransactionId::from_uuid(receipt.transaction_id),
                account_id: AccountId::from_uuid(receipt.account_id),
                kind,
                amount: payload.amount,
                new_balance: receipt.new_balance,
            });
            (
                StatusCode::OK,
                Json(EntryReceiptResponse {
                    transaction_id: receipt.transaction_id,
                    account_id: receipt.account_id,
                    new_balance: receipt.new_balance,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to edit entry");
            ledger_error_response(&e)
        }
    }
}

async fn delete_entry(
    state: &AppState,
    owner_id: Uuid,
    transaction_id: Uuid,
    kind: TransactionKind,
) -> Response {
    let repo = LedgerRepository::new((*state.db).clone());

    if let Err(e) = ensure_entry_kind(&repo, owner_id, transaction_id, kind).await {
        error!(error = %e, "Failed to delete entry");
        return ledger_error_response(&e);
    }

    match repo.reverse(owner_id, transaction_id).await {
        Ok(receipt) => {
            info!(
                owner_id = %owner_id,
                transaction_id = %transaction_id,
                "Entry voided"
            );
            state.publish(LedgerEvent::TransactionReversed {
                owner_id: OwnerId::from_uuid(owner_id),
                transaction_id: TransactionId::from_uuid(transaction_id),
                account_id: AccountId::from_uuid(receipt.account_id),
                new_balance: receipt.new_balance,
            });
            (
                StatusCode::OK,
                Json(EntryReceiptResponse {
                    transaction_id: receipt.transaction_id,
                    account_id: receipt.account_id,
                    new_balance: receipt.new_balance,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete entry");
            ledger_error_response(&e)
        }
    }
}

/// Confirms the target row exists and carries the kind this route serves,
/// so an expense endpoint never voids an income row.
async fn ensure_entry_kind(
    repo: &LedgerRepository,
    owner_id: Uuid,
    transaction_id: Uuid,
    expected: TransactionKind,
) -> Result<(), LedgerError> {
    let row = repo.get_transaction(owner_id, transaction_id).await?;
    if TransactionKind::from(row.kind) == expected {
        Ok(())
    } else {
        Err(LedgerError::TransactionNotFound(transaction_id))
    }
}
