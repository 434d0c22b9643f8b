//! HTTP API layer with Axum routes and the event stream.
//!
//! This crate provides:
//! - REST routes for ledger, installment, queue and sync operations
//! - A WebSocket event stream backed by a broadcast bus
//! - Health reporting covering both stores

pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use kasku_core::events::LedgerEvent;

/// Application state shared across handlers.
///
/// Both connections are constructed in the server binary and injected here;
/// no handler reaches for a global store client.
#[derive(Clone)]
pub struct AppState {
    /// Store-of-record connection pool (PostgreSQL).
    pub db: Arc<DatabaseConnection>,
    /// Device-local queue store connection (SQLite).
    pub queue_db: Arc<DatabaseConnection>,
    /// Broadcast bus feeding the WebSocket event streams.
    pub events: broadcast::Sender<LedgerEvent>,
}

impl AppState {
    /// Publishes an event to every open event stream.
    ///
    /// A send error only means nobody is subscribed right now.
    pub fn publish(&self, event: LedgerEvent) {
        let _ = self.events.send(event);
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
