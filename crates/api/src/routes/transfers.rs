//! Transfer routes.
//!
//! A transfer posts a linked debit/credit pair atomically. No category is
//! involved; money moves between the owner's own accounts.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::ledger_error_response;
use kasku_core::events::LedgerEvent;
use kasku_core::ledger::TransactionKind;
use kasku_db::repositories::{LedgerRepository, TransactionMeta};
use kasku_shared::types::{AccountId, OwnerId, TransactionId};

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/owners/{owner_id}/transfers", post(create_transfer))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for moving money between two accounts.
#[derive(Debug, Deserialize)]
pub struct CreateTransferRequest {
    /// Source account.
    pub from_account_id: Uuid,
    /// Destination account.
    pub to_account_id: Uuid,
    /// Positive amount to move.
    pub amount: Decimal,
    /// Transfer date.
    pub date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Receipt for a committed transfer.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// The outgoing row on the source account.
    pub out_transaction_id: Uuid,
    /// The incoming row on the destination account.
    pub in_transaction_id: Uuid,
    /// Source balance after commit.
    pub from_balance: Decimal,
    /// Destination balance after commit.
    pub to_balance: Decimal,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/owners/{owner_id}/transfers` - Move money between accounts.
async fn create_transfer(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<CreateTransferRequest>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    let meta = TransactionMeta {
        owner_id,
        category_id: None,
        date: payload.date,
        notes: payload.notes,
        installment_id: None,
        replay_key: None,
    };

    match repo
        .apply_transfer(
            payload.from_account_id,
            payload.to_account_id,
            payload.amount,
            meta,
        )
        .await
    {
        Ok(receipt) => {
            info!(
                owner_id = %owner_id,
                out_transaction_id = %receipt.out_transaction_id,
                in_transaction_id = %receipt.in_transaction_id,
                "Transfer posted"
            );
            state.publish(LedgerEvent::TransactionPosted {
                owner_id: OwnerId::from_uuid(owner_id),
                transaction_id: TransactionId::from_uuid(receipt.out_transaction_id),
                account_id: AccountId::from_uuid(payload.from_account_id),
                kind: TransactionKind::TransferOut,
                amount: payload.amount,
                new_balance: receipt.from_balance,
            });
            state.publish(LedgerEvent::TransactionPosted {
                owner_id: OwnerId::from_uuid(owner_id),
                transaction_id: TransactionId::from_uuid(receipt.in_transaction_id),
                account_id: AccountId::from_uuid(payload.to_account_id),
                kind: TransactionKind::TransferIn,
                amount: payload.amount,
                new_balance: receipt.to_balance,
            });
            (
                StatusCode::CREATED,
                Json(TransferResponse {
                    out_transaction_id: receipt.out_transaction_id,
                    in_transaction_id: receipt.in_transaction_id,
                    from_balance: receipt.from_balance,
                    to_balance: receipt.to_balance,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to post transfer");
            ledger_error_response(&e)
        }
    }
}
