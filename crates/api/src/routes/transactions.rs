//! Transaction history routes.
//!
//! Read-only views over the ledger. Rows are never mutated through these
//! routes; edits and voids live on the expense, income and installment
//! routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::routes::ledger_error_response;
use kasku_core::ledger::{TransactionKind, TransactionStatus};
use kasku_db::entities::transactions;
use kasku_db::repositories::{LedgerRepository, TransactionFilter};
use kasku_shared::types::{PageRequest, PageResponse};

/// Creates the transaction history routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/owners/{owner_id}/transactions", get(list_transactions))
        .route(
            "/owners/{owner_id}/transactions/{transaction_id}",
            get(get_transaction),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by transaction kind.
    pub kind: Option<String>,
    /// Filter by lifecycle status (posted, voided).
    pub status: Option<String>,
    /// Filter by account.
    pub account_id: Option<Uuid>,
    /// Filter by date range start (inclusive).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub to: Option<NaiveDate>,
    /// Page number (1-based).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Response for a transaction row.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Account the row posted against.
    pub account_id: Uuid,
    /// Transaction kind.
    pub kind: String,
    /// Lifecycle status.
    pub status: String,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Peer account for transfer rows.
    pub counterparty_account_id: Option<Uuid>,
    /// Category reference.
    pub category_id: Option<Uuid>,
    /// Installment the row pays, if any.
    pub installment_id: Option<Uuid>,
    /// Transaction date.
    pub date: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp; moves when the row is voided.
    pub updated_at: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            kind: TransactionKind::from(model.kind).to_string(),
            status: status_to_string(TransactionStatus::from(model.status)).to_string(),
            amount: model.amount,
            counterparty_account_id: model.counterparty_account_id,
            category_id: model.category_id,
            installment_id: model.installment_id,
            date: model.date.to_string(),
            notes: model.notes,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/owners/{owner_id}/transactions` - List transactions.
///
/// Unknown filter values fall back to their defaults rather than erroring.
/// The listing covers posted rows; voided rows appear only under
/// `status=voided`.
async fn list_transactions(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    let filter = TransactionFilter {
        account_id: query.account_id,
        kind: query
            .kind
            .as_deref()
            .and_then(|s| TransactionKind::from_str(s).ok()),
        status: query
            .status
            .as_deref()
            .and_then(string_to_status)
            .or(Some(TransactionStatus::Posted)),
        date_from: query.from,
        date_to: query.to,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    match repo.list_transactions(owner_id, filter, page).await {
        Ok(page) => {
            let response = PageResponse {
                data: page
                    .data
                    .into_iter()
                    .map(TransactionResponse::from)
                    .collect::<Vec<_>>(),
                meta: page.meta,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list transactions");
            ledger_error_response(&e)
        }
    }
}

/// GET `/owners/{owner_id}/transactions/{transaction_id}` - Get one transaction.
async fn get_transaction(
    State(state): State<AppState>,
    Path((owner_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.get_transaction(owner_id, transaction_id).await {
        Ok(row) => (StatusCode::OK, Json(TransactionResponse::from(row))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get transaction");
            ledger_error_response(&e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn string_to_status(s: &str) -> Option<TransactionStatus> {
    match s {
        "posted" => Some(TransactionStatus::Posted),
        "voided" => Some(TransactionStatus::Voided),
        _ => None,
    }
}

const fn status_to_string(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Posted => "posted",
        TransactionStatus::Voided => "voided",
    }
}
