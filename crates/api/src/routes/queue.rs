//! Offline queue routes.
//!
//! The queue lives in the device-local SQLite store, so these routes work
//! while the store of record is unreachable. The request body is the typed
//! offline payload itself; what was queued is exactly what will replay.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::queue_error_response;
use kasku_core::offline::OfflinePayload;
use kasku_db::entities::pending_operations;
use kasku_db::entities::sea_orm_active_enums::QueueEntryStatus;
use kasku_db::repositories::QueueRepository;

/// Creates the offline queue routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/owners/{owner_id}/queue", post(enqueue_operation))
        .route("/owners/{owner_id}/queue/count", get(pending_count))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a queued operation.
#[derive(Debug, Serialize)]
pub struct QueueEntryResponse {
    /// Queue entry ID; doubles as the replay key.
    pub id: Uuid,
    /// Operation kind (create, update, delete).
    pub op_kind: String,
    /// Entity the operation targets.
    pub entity_kind: String,
    /// Replay state.
    pub status: String,
    /// Replay attempts so far.
    pub attempt_count: i32,
    /// Enqueued at timestamp.
    pub enqueued_at: String,
}

impl From<pending_operations::Model> for QueueEntryResponse {
    fn from(model: pending_operations::Model) -> Self {
        Self {
            id: model.id,
            op_kind: model.op_kind,
            entity_kind: model.entity_kind,
            status: queue_status_to_string(&model.status).to_string(),
            attempt_count: model.attempt_count,
            enqueued_at: model.enqueued_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/owners/{owner_id}/queue` - Queue an offline mutation for replay.
async fn enqueue_operation(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Json(payload): Json<OfflinePayload>,
) -> impl IntoResponse {
    let repo = QueueRepository::new((*state.queue_db).clone());

    match repo.enqueue(owner_id, &payload).await {
        Ok(entry) => {
            info!(
                owner_id = %owner_id,
                entry_id = %entry.id,
                op_kind = %entry.op_kind,
                entity_kind = %entry.entity_kind,
                "Operation queued"
            );
            (StatusCode::CREATED, Json(QueueEntryResponse::from(entry))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to queue operation");
            queue_error_response(&e)
        }
    }
}

/// GET `/owners/{owner_id}/queue/count` - Count operations awaiting replay.
async fn pending_count(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = QueueRepository::new((*state.queue_db).clone());

    match repo.count_pending(owner_id).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "pending": count }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to count pending operations");
            queue_error_response(&e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const fn queue_status_to_string(status: &QueueEntryStatus) -> &'static str {
    match status {
        QueueEntryStatus::Pending => "pending",
        QueueEntryStatus::Failed => "failed",
    }
}


#[cfg(test)]
pub(crate) mod integration_tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header::CONTENT_TYPE},
    };
    use sea_orm::ConnectOptions;
    use std::sync::Arc;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    use kasku_db::queue_migration::{MigratorTrait, QueueMigrator};

    /// Builds an AppState over two in-memory SQLite stores. The queue store
    /// carries its real schema; the store of record stays empty, which is
    /// fine for routes that never touch it.
    pub(crate) async fn create_test_state() -> AppState {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = sea_orm::Database::connect(options)
            .await
            .expect("store should open");

        let mut queue_options = ConnectOptions::new("sqlite::memory:");
        queue_options.max_connections(1);
        let queue_db = sea_orm::Database::connect(queue_options)
            .await
            .expect("queue store should open");
        QueueMigrator::up(&queue_db, None)
            .await
            .expect("queue schema should apply");

        let (events, _) = broadcast::channel(16);
        AppState {
            db: Arc::new(db),
            queue_db: Arc::new(queue_db),
            events,
        }
    }

    #[tokio::test]
    async fn test_enqueue_then_count() {
        let state = create_test_state().await;
        let app = Router::new().merge(routes()).with_state(state);

        let owner_id = Uuid::new_v4();
        let body = serde_json::json!({
            "intent": "create_expense",
            "account_id": Uuid::new_v4(),
            "category_id": Uuid::new_v4(),
            "amount": "75.50",
            "date": "2026-08-20",
            "notes": "offline coffee run"
        })
        .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/owners/{owner_id}/queue"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let entry: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(entry["op_kind"], "create");
        assert_eq!(entry["entity_kind"], "expense");
        assert_eq!(entry["status"], "pending");
        assert_eq!(entry["attempt_count"], 0);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/owners/{owner_id}/queue/count"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let count: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(count["pending"], 1);
    }

    #[tokio::test]
    async fn test_count_is_scoped_to_owner() {
        let state = create_test_state().await;
        let app = Router::new().merge(routes()).with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/owners/{}/queue/count", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let count: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(count["pending"], 0);
    }

    #[tokio::test]
    async fn test_enqueue_rejects_unknown_intent() {
        let state = create_test_state().await;
        let app = Router::new().merge(routes()).with_state(state);

        let body = serde_json::json!({
            "intent": "refinance_mortgage",
            "amount": "10.00"
        })
        .to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/owners/{}/queue", Uuid::new_v4()))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Axum's Json extractor rejects the unknown tag before the handler runs
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
