//! Health check endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;

use crate::AppState;

/// Health of one backing store.
#[derive(Serialize)]
pub struct StoreHealth {
    /// Whether the store answered a ping.
    pub reachable: bool,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Store of record (PostgreSQL).
    pub store_of_record: StoreHealth,
    /// Offline queue store (SQLite).
    pub queue_store: StoreHealth,
}

/// Health check handler.
///
/// The service is degraded, not down, while the store of record is
/// unreachable: mutations still land in the offline queue.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = state.db.ping().await.is_ok();
    let queue_ok = state.queue_db.ping().await.is_ok();

    let status = match (store_ok, queue_ok) {
        (true, true) => "healthy",
        (false, true) => "degraded",
        (_, false) => "unhealthy",
    };
    let code = if queue_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store_of_record: StoreHealth {
                reachable: store_ok,
            },
            queue_store: StoreHealth {
                reachable: queue_ok,
            },
        }),
    )
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::routes::queue::integration_tests::create_test_state;

    #[tokio::test]
    async fn test_health_reports_both_stores() {
        let state = create_test_state().await;
        let app = Router::new().merge(routes()).with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["store_of_record"]["reachable"], true);
        assert_eq!(health["queue_store"]["reachable"], true);
    }
}
