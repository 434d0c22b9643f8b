//! API route definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use kasku_core::installment::InstallmentError;
use kasku_core::ledger::LedgerError;
use kasku_db::repositories::QueueError;

use crate::AppState;

pub mod accounts;
pub mod entries;
pub mod events;
pub mod health;
pub mod installments;
pub mod queue;
pub mod sync;
pub mod transactions;
pub mod transfers;

/// Creates the API router with all routes.
pub fn api_routes() -> axum::Router<AppState> {
    axum::Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(entries::routes())
        .merge(transfers::routes())
        .merge(transactions::routes())
        .merge(installments::routes())
        .merge(queue::routes())
        .merge(sync::routes())
        .merge(events::routes())
}

// ============================================================================
// Error mapping
// ============================================================================

/// Builds the standard `{"error", "message"}` body.
pub(crate) fn error_response(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    // Internal details stay in the logs.
    let message = if status.is_server_error() {
        "An error occurred"
    } else {
        message
    };

    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

/// Maps a ledger error onto the standard error body.
pub(crate) fn ledger_error_response(e: &LedgerError) -> Response {
    error_response(e.http_status_code(), e.error_code(), &e.to_string())
}

/// Maps an installment error onto the standard error body.
pub(crate) fn installment_error_response(e: &InstallmentError) -> Response {
    error_response(e.http_status_code(), e.error_code(), &e.to_string())
}

/// Maps a queue error onto the standard error body.
pub(crate) fn queue_error_response(e: &QueueError) -> Response {
    error_response(e.http_status_code(), e.error_code(), &e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_error_response_status() {
        assert_eq!(error_response(404, "NOT_FOUND", "gone").status(), 404);
        assert_eq!(error_response(422, "TOO_BIG", "no").status(), 422);
        // Bogus codes collapse to 500 rather than panic
        assert_eq!(error_response(1000, "BROKEN", "x").status(), 500);
    }

    #[test]
    fn test_ledger_errors_map_to_expected_statuses() {
        let insufficient = LedgerError::InsufficientBalance {
            available: dec!(10),
            requested: dec!(25),
        };
        assert_eq!(ledger_error_response(&insufficient).status(), 422);

        let missing = LedgerError::AccountNotFound(Uuid::new_v4());
        assert_eq!(ledger_error_response(&missing).status(), 404);

        assert_eq!(ledger_error_response(&LedgerError::StoreConflict).status(), 409);

        let invalid = LedgerError::InvalidAmount(dec!(0));
        assert_eq!(ledger_error_response(&invalid).status(), 400);
    }

    #[test]
    fn test_installment_errors_delegate_ledger_statuses() {
        let wrapped = InstallmentError::Ledger(LedgerError::InsufficientBalance {
            available: dec!(5),
            requested: dec!(124),
        });
        assert_eq!(installment_error_response(&wrapped).status(), 422);

        let missing = InstallmentError::NotFound(Uuid::new_v4());
        assert_eq!(installment_error_response(&missing).status(), 404);
    }

    #[test]
    fn test_queue_errors_map_to_expected_statuses() {
        let missing = QueueError::NotFound(Uuid::new_v4());
        assert_eq!(queue_error_response(&missing).status(), 404);
    }
}
