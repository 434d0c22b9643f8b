//! Installment plan routes.
//!
//! Plans store only their schedule inputs; derived figures arrive in the
//! embedded schedule block, recomputed on every read. Payments debit the
//! funding account through the ledger, one transaction per payment however
//! many periods it covers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::installment_error_response;
use kasku_core::events::LedgerEvent;
use kasku_core::installment::{EffectiveStatus, Schedule};
use kasku_db::entities::installment_payments;
use kasku_db::repositories::{
    CreateInstallmentInput, InstallmentFilter, InstallmentRepository, InstallmentSnapshot,
    PayPeriodsInput, UpdateInstallmentInput,
};
use kasku_shared::types::{InstallmentId, OwnerId};

/// Creates the installment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/owners/{owner_id}/installments", get(list_installments))
        .route("/owners/{owner_id}/installments", post(create_installment))
        .route(
            "/owners/{owner_id}/installments/{installment_id}",
            get(get_installment),
        )
        .route(
            "/owners/{owner_id}/installments/{installment_id}",
            patch(update_installment),
        )
        .route(
            "/owners/{owner_id}/installments/{installment_id}",
            delete(delete_installment),
        )
        .route(
            "/owners/{owner_id}/installments/{installment_id}/payments",
            get(list_payments),
        )
        .route(
            "/owners/{owner_id}/installments/{installment_id}/payments",
            post(pay_periods),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing installments.
#[derive(Debug, Deserialize)]
pub struct ListInstallmentsQuery {
    /// Filter by presented status (active, completed, overdue).
    pub status: Option<String>,
}

/// Request body for creating an installment plan.
#[derive(Debug, Deserialize)]
pub struct CreateInstallmentRequest {
    /// Display title.
    pub title: String,
    /// Borrowed amount, before interest.
    pub principal: Decimal,
    /// Total number of periods.
    pub term_count: u32,
    /// Flat interest rate per period, in percent.
    pub periodic_rate_percent: Decimal,
    /// Date the whole installment is due.
    pub due_date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating an installment plan.
#[derive(Debug, Deserialize)]
pub struct UpdateInstallmentRequest {
    /// New title.
    pub title: Option<String>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New notes.
    pub notes: Option<String>,
    /// New principal (only before the first payment).
    pub principal: Option<Decimal>,
    /// New term count (only before the first payment).
    pub term_count: Option<u32>,
    /// New periodic rate (only before the first payment).
    pub periodic_rate_percent: Option<Decimal>,
}

/// Request body for paying one or more periods.
#[derive(Debug, Deserialize)]
pub struct PayPeriodsRequest {
    /// Periods to pay; clamped to the periods remaining.
    pub periods_count: u32,
    /// Account the payment debits.
    pub account_id: Uuid,
    /// Payment date.
    pub date: NaiveDate,
    /// Free-form notes for the ledger row.
    pub notes: Option<String>,
}

/// Response for an installment plan.
#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    /// Installment ID.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Borrowed amount, before interest.
    pub principal: Decimal,
    /// Total number of periods.
    pub term_count: i32,
    /// Flat interest rate per period, in percent.
    pub periodic_rate_percent: Decimal,
    /// Date the whole installment is due.
    pub due_date: String,
    /// Periods paid so far.
    pub paid_periods: i32,
    /// Cumulative amount paid.
    pub total_paid: Decimal,
    /// Amount still owed.
    pub remaining_amount: Decimal,
    /// Status as presented, overdue included.
    pub status: EffectiveStatus,
    /// Derived schedule figures.
    pub schedule: Schedule,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<InstallmentSnapshot> for InstallmentResponse {
    fn from(snapshot: InstallmentSnapshot) -> Self {
        let row = snapshot.installment;
        Self {
            id: row.id,
            title: row.title,
            principal: row.principal,
            term_count: row.term_count,
            periodic_rate_percent: row.periodic_rate_percent,
            due_date: row.due_date.to_string(),
            paid_periods: row.paid_periods,
            total_paid: row.total_paid,
            remaining_amount: row.remaining_amount,
            status: snapshot.effective_status,
            schedule: snapshot.schedule,
            notes: row.notes,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

/// Receipt for a committed period payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
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

/// Response for one recorded payment period.
#[derive(Debug, Serialize)]
pub struct PaymentRecordResponse {
    /// Payment record ID.
    pub id: Uuid,
    /// Period this record covers (1-based).
    pub period_number: i32,
    /// Amount attributed to this period.
    pub amount: Decimal,
    /// Payment date.
    pub date: String,
    /// Account the payment debited.
    pub account_id: Uuid,
    /// Ledger transaction the payment posted under.
    pub transaction_id: Uuid,
}

impl From<installment_payments::Model> for PaymentRecordResponse {
    fn from(model: installment_payments::Model) -> Self {
        Self {
            id: model.id,
            period_number: model.period_number,
            amount: model.amount,
            date: model.date.to_string(),
            account_id: model.account_id,
            transaction_id: model.transaction_id,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/owners/{owner_id}/installments` - List installments.
async fn list_installments(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<ListInstallmentsQuery>,
) -> impl IntoResponse {
    let repo = InstallmentRepository::new((*state.db).clone());

    let filter = InstallmentFilter {
        status: query.status.as_deref().and_then(string_to_effective_status),
    };

    match repo.list_installments(owner_id, filter).await {
        Ok(snapshots) => {
            let items: Vec<InstallmentResponse> = snapshots
                .into_iter()
                .map(InstallmentResponse::from)
                .collect();
            (StatusCode::OK, Json(json!({ "installments": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list installments");
            installment_error_response(&e)
        }
    }
}

/// POST `/owners/{owner_id}/installments` - Create an installment plan.
async fn create_installment(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<CreateInstallmentRequest>,
) -> impl IntoResponse {
    let repo = InstallmentRepository::new((*state.db).clone());

    match repo
        .create_installment(CreateInstallmentInput {
            owner_id,
            title: payload.title,
            principal: payload.principal,
            term_count: payload.term_count,
            periodic_rate_percent: payload.periodic_rate_percent,
            due_date: payload.due_date,
            notes: payload.notes,
            replay_key: None,
        })
        .await
    {
        Ok(snapshot) => {
            info!(
                owner_id = %owner_id,
                installment_id = %snapshot.installment.id,
                "Installment created"
            );
            state.publish(LedgerEvent::InstallmentCreated {
                owner_id: OwnerId::from_uuid(owner_id),
                installment_id: InstallmentId::from_uuid(snapshot.installment.id),
                total_payable: snapshot.schedule.total_with_interest,
            });
            (StatusCode::CREATED, Json(InstallmentResponse::from(snapshot))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create installment");
            installment_error_response(&e)
        }
    }
}

/// GET `/owners/{owner_id}/installments/{installment_id}` - Get one plan.
async fn get_installment(
    State(state): State<AppState>,
    Path((owner_id, installment_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = InstallmentRepository::new((*state.db).clone());

    match repo.get_installment(owner_id, installment_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(InstallmentResponse::from(snapshot))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get installment");
            installment_error_response(&e)
        }
    }
}

/// PATCH `/owners/{owner_id}/installments/{installment_id}` - Update a plan.
///
/// Schedule inputs lock after the first payment; title, due date and notes
/// stay editable for the plan's whole life.
async fn update_installment(
    State(state): State<AppState>,
    Path((owner_id, installment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateInstallmentRequest>,
) -> impl IntoResponse {
    let repo = InstallmentRepository::new((*state.db).clone());

    match repo
        .update_installment(
            owner_id,
            installment_id,
            UpdateInstallmentInput {
                title: payload.title,
                due_date: payload.due_date,
                notes: payload.notes,
                principal: payload.principal,
                term_count: payload.term_count,
                periodic_rate_percent: payload.periodic_rate_percent,
            },
        )
        .await
    {
        Ok(snapshot) => {
            info!(owner_id = %owner_id, installment_id = %installment_id, "Installment updated");
            (StatusCode::OK, Json(InstallmentResponse::from(snapshot))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update installment");
            installment_error_response(&e)
        }
    }
}

/// DELETE `/owners/{owner_id}/installments/{installment_id}` - Delete a plan.
///
/// Only plans with no recorded payments can be deleted; paid plans keep
/// their ledger history.
async fn delete_installment(
    State(state): State<AppState>,
    Path((owner_id, installment_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = InstallmentRepository::new((*state.db).clone());

    match repo.delete_installment(owner_id, installment_id).await {
        Ok(()) => {
            info!(owner_id = %owner_id, installment_id = %installment_id, "Installment deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Installment deleted" })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete installment");
            installment_error_response(&e)
        }
    }
}

/// GET `/owners/{owner_id}/installments/{installment_id}/payments` - List
/// recorded payments, one entry per paid period.
async fn list_payments(
    State(state): State<AppState>,
    Path((owner_id, installment_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = InstallmentRepository::new((*state.db).clone());

    match repo.list_payments(owner_id, installment_id).await {
        Ok(payments) => {
            let items: Vec<PaymentRecordResponse> = payments
                .into_iter()
                .map(PaymentRecordResponse::from)
                .collect();
            (StatusCode::OK, Json(json!({ "payments": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list installment payments");
            installment_error_response(&e)
        }
    }
}

/// POST `/owners/{owner_id}/installments/{installment_id}/payments` - Pay
/// one or more periods.
async fn pay_periods(
    State(state): State<AppState>,
    Path((owner_id, installment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PayPeriodsRequest>,
) -> impl IntoResponse {
    let repo = InstallmentRepository::new((*state.db).clone());

    match repo
        .pay_periods(PayPeriodsInput {
            owner_id,
            installment_id,
            periods_count: payload.periods_count,
            account_id: payload.account_id,
            date: payload.date,
            notes: payload.notes,
            replay_key: None,
        })
        .await
    {
        Ok(receipt) => {
            info!(
                owner_id = %owner_id,
                installment_id = %installment_id,
                paid_periods = receipt.paid_periods,
                completed = receipt.completed,
                "Installment payment posted"
            );
            state.publish(LedgerEvent::InstallmentProgressed {
                owner_id: OwnerId::from_uuid(owner_id),
                installment_id: InstallmentId::from_uuid(installment_id),
                paid_periods: receipt.paid_periods,
                remaining_amount: receipt.remaining_amount,
                completed: receipt.completed,
            });
            (
                StatusCode::CREATED,
                Json(PaymentResponse {
                    transaction_id: receipt.transaction_id,
                    account_new_balance: receipt.account_new_balance,
                    paid_periods: receipt.paid_periods,
                    total_paid: receipt.total_paid,
                    remaining_amount: receipt.remaining_amount,
                    completed: receipt.completed,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to pay installment periods");
            installment_error_response(&e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn string_to_effective_status(s: &str) -> Option<EffectiveStatus> {
    match s {
        "active" => Some(EffectiveStatus::Active),
        "completed" => Some(EffectiveStatus::Completed),
        "overdue" => Some(EffectiveStatus::Overdue),
        _ => None,
    }
}
