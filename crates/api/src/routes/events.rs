//! Live event stream routes.
//!
//! One WebSocket per client. Ledger events scoped to other owners are
//! filtered out server-side; device-wide events (connectivity flips) reach
//! every subscriber. Client frames are read only to notice the close.

use axum::{
    Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::AppState;
use kasku_core::events::LedgerEvent;

/// Creates the event stream routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/owners/{owner_id}/events", get(event_stream))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/owners/{owner_id}/events` - Subscribe to the owner's event stream.
async fn event_stream(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let receiver = state.events.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, receiver, owner_id))
}

async fn handle_socket(
    mut socket: WebSocket,
    mut receiver: broadcast::Receiver<LedgerEvent>,
    owner_id: Uuid,
) {
    debug!(owner_id = %owner_id, "Event stream opened");

    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Ok(event) => {
                    let in_scope = event
                        .owner_id()
                        .is_none_or(|id| id.into_inner() == owner_id);
                    if !in_scope {
                        continue;
                    }
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Slow consumer: the channel dropped frames rather than
                    // buffer without bound.
                    warn!(owner_id = %owner_id, skipped, "Event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!(owner_id = %owner_id, "Event stream closed");
}
