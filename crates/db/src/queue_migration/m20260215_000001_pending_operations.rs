//! Schema for the device-local offline queue (SQLite).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(PENDING_OPERATIONS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

// UUIDs land as BLOBs and timestamps as UTC text, matching how sqlx binds
// them on SQLite.
const PENDING_OPERATIONS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS pending_operations (
    id BLOB NOT NULL PRIMARY KEY,
    owner_id BLOB NOT NULL,
    op_kind TEXT NOT NULL,
    entity_kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    last_error TEXT,
    attempt_count INTEGER NOT NULL DEFAULT 0,
    enqueued_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pending_owner_enqueued
    ON pending_operations(owner_id, status, enqueued_at);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS pending_operations;
";
