//! Kasku API Server
//!
//! Main entry point for the Kasku backend service. Connects both stores,
//! prepares the offline queue schema, and keeps a connectivity watch on
//! the store of record so queued operations drain as soon as it returns.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, DatabaseConnection};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kasku_api::{AppState, create_router};
use kasku_core::events::LedgerEvent;
use kasku_db::queue_migration::{MigratorTrait, QueueMigrator};
use kasku_db::repositories::{InstallmentRepository, LedgerRepository, QueueRepository};
use kasku_db::sync::SyncReconciler;
use kasku_shared::AppConfig;
use kasku_shared::types::OwnerId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kasku=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to the store of record
    let mut db_options = ConnectOptions::new(&config.database.url);
    db_options
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections);
    let db = sea_orm::Database::connect(db_options).await?;
    info!("Connected to store of record");

    // Connect to the device-local queue store. A single connection keeps
    // SQLite writers from tripping over each other.
    let mut queue_options = ConnectOptions::new(&config.queue.url);
    queue_options.max_connections(1);
    let queue_db = sea_orm::Database::connect(queue_options).await?;
    QueueMigrator::up(&queue_db, None).await?;
    info!("Offline queue store ready");

    // Event fan-out channel for WebSocket subscribers
    let (events, _) = broadcast::channel(256);

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        queue_db: Arc::new(queue_db),
        events,
    };

    // Connectivity signal: the probe feeds it, the drain task reacts to edges
    let (connectivity_tx, connectivity_rx) = watch::channel(true);
    tokio::spawn(probe_connectivity(
        state.db.clone(),
        config.sync.probe_interval_secs,
        connectivity_tx,
    ));
    tokio::spawn(drain_on_reconnect(
        state.clone(),
        config.sync.auto_drain,
        connectivity_rx,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Probes the store of record and feeds the connectivity signal.
async fn probe_connectivity(
    db: Arc<DatabaseConnection>,
    probe_interval_secs: u64,
    tx: watch::Sender<bool>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(probe_interval_secs));

    loop {
        interval.tick().await;

        let online = db.ping().await.is_ok();
        // Receivers only wake on actual flips.
        tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }
}

/// Announces connectivity flips and drains the queue when the store returns.
async fn drain_on_reconnect(
    state: AppState,
    auto_drain: bool,
    mut connectivity: watch::Receiver<bool>,
) {
    while connectivity.changed().await.is_ok() {
        let online = *connectivity.borrow_and_update();
        info!(online, "Store of record connectivity changed");
        state.publish(LedgerEvent::ConnectivityChanged { online });

        if online && auto_drain {
            drain_pending_owners(&state).await;
        }
    }
}

/// Drains every owner with queued operations, one drain report each.
async fn drain_pending_owners(state: &AppState) {
    let queue = QueueRepository::new((*state.queue_db).clone());
    let reconciler = SyncReconciler::new(
        queue.clone(),
        LedgerRepository::new((*state.db).clone()),
        InstallmentRepository::new((*state.db).clone()),
    );

    let owners = match queue.pending_owners().await {
        Ok(owners) => owners,
        Err(e) => {
            error!(error = %e, "Auto drain could not list pending owners");
            return;
        }
    };

    for owner_id in owners {
        match reconciler.drain(owner_id).await {
            Ok(report) => {
                info!(
                    owner_id = %owner_id,
                    replayed = report.replayed,
                    failed = report.failed,
                    skipped = report.skipped,
                    "Auto drain finished"
                );
                state.publish(LedgerEvent::SyncCompleted {
                    owner_id: OwnerId::from_uuid(owner_id),
                    replayed: report.replayed,
                    failed: report.failed,
                });
            }
            Err(e) => {
                error!(owner_id = %owner_id, error = %e, "Auto drain failed");
            }
        }
    }
}
