//! Sync routes.
//!
//! Draining replays the owner's queued offline operations against the
//! store of record. The server also drains automatically when
//! connectivity returns; this route lets a client force the same pass.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::queue_error_response;
use kasku_core::events::LedgerEvent;
use kasku_db::repositories::{InstallmentRepository, LedgerRepository, QueueRepository};
use kasku_db::sync::SyncReconciler;
use kasku_shared::types::OwnerId;

/// Creates the sync routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/owners/{owner_id}/sync", post(trigger_sync))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/owners/{owner_id}/sync` - Drain the owner's offline queue.
///
/// Replays entries oldest-first with creates before updates before
/// deletes. Failed entries stay queued; the report says how many entries
/// replayed, failed or were skipped as already applied.
async fn trigger_sync(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> impl IntoResponse {
    let reconciler = SyncReconciler::new(
        QueueRepository::new((*state.queue_db).clone()),
        LedgerRepository::new((*state.db).clone()),
        InstallmentRepository::new((*state.db).clone()),
    );

    match reconciler.drain(owner_id).await {
        Ok(report) => {
            info!(
                owner_id = %owner_id,
                replayed = report.replayed,
                failed = report.failed,
                skipped = report.skipped,
                "Offline queue drained"
            );
            state.publish(LedgerEvent::SyncCompleted {
                owner_id: OwnerId::from_uuid(owner_id),
                replayed: report.replayed,
                failed: report.failed,
            });
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to drain offline queue");
            queue_error_response(&e)
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::routes::queue::integration_tests::create_test_state;

    #[tokio::test]
    async fn test_sync_with_empty_queue_reports_zeros() {
        let state = create_test_state().await;
        let mut events = state.events.subscribe();
        let app = Router::new().merge(routes()).with_state(state);

        let owner_id = Uuid::new_v4();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/owners/{owner_id}/sync"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let report: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report["replayed"], 0);
        assert_eq!(report["failed"], 0);
        assert_eq!(report["skipped"], 0);

        // Even an empty drain announces completion to subscribers
        let event = events.try_recv().expect("drain should publish an event");
        assert_eq!(
            event,
            LedgerEvent::SyncCompleted {
                owner_id: OwnerId::from_uuid(owner_id),
                replayed: 0,
                failed: 0,
            }
        );
    }
}
