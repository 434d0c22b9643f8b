//! Queue repository over the device-local offline operation store.
//!
//! Entries are removed on successful replay, so every row in the table is
//! still queued; the status column only distinguishes never-attempted
//! entries from ones whose last replay failed. The row id doubles as the
//! replay key the store of record uses for idempotency.

use chrono::Utc;
use kasku_core::offline::OfflinePayload;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{pending_operations, sea_orm_active_enums::QueueEntryStatus};

/// Errors that can occur during queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Queue entry not found.
    #[error("Queue entry not found: {0}")]
    NotFound(Uuid),

    /// Payload could not be serialized or deserialized.
    #[error("Payload codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl QueueError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "QUEUE_ENTRY_NOT_FOUND",
            Self::Codec(_) => "PAYLOAD_CODEC_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Codec(_) => 400,
            Self::Database(_) => 500,
        }
    }
}

/// Queue repository.
#[derive(Debug, Clone)]
pub struct QueueRepository {
    db: DatabaseConnection,
}

impl QueueRepository {
    /// Creates a new queue repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Durably appends an operation to the queue and returns the stored
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized or the insert
    /// fails.
    pub async fn enqueue(
        &self,
        owner_id: Uuid,
        payload: &OfflinePayload,
    ) -> Result<pending_operations::Model, QueueError> {
        let now = Utc::now();
        let row = pending_operations::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            op_kind: Set(payload.op_kind().to_string()),
            entity_kind: Set(payload.entity_kind().to_string()),
            payload: Set(encode_payload(payload)?),
            status: Set(QueueEntryStatus::Pending),
            last_error: Set(None),
            attempt_count: Set(0),
            enqueued_at: Set(now),
            updated_at: Set(now),
        };

        Ok(row.insert(&self.db).await?)
    }

    /// Lists every queued entry for an owner, oldest first.
    ///
    /// Failed entries stay in line and are picked up again by the next
    /// drain.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn list_pending(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<pending_operations::Model>, QueueError> {
        let rows = pending_operations::Entity::find()
            .filter(pending_operations::Column::OwnerId.eq(owner_id))
            .order_by_asc(pending_operations::Column::EnqueuedAt)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Removes an entry whose operation was applied, or confirmed as
    /// already applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or the delete fails.
    pub async fn remove(&self, entry_id: Uuid) -> Result<(), QueueError> {
        let result = pending_operations::Entity::delete_by_id(entry_id)
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(QueueError::NotFound(entry_id));
        }

        Ok(())
    }

    /// Records a failed replay attempt; the entry stays queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or the update fails.
    pub async fn mark_failed(&self, entry_id: Uuid, error: &str) -> Result<(), QueueError> {
        let result = pending_operations::Entity::update_many()
            .col_expr(pending_operations::Column::LastError, Expr::value(error))
            // Plain string write: CAST(.. AS enum) is a Postgres idiom the
            // SQLite store must not see.
            .col_expr(
                pending_operations::Column::Status,
                Expr::value(QueueEntryStatus::Failed),
            )
            .col_expr(
                pending_operations::Column::AttemptCount,
                Expr::col(pending_operations::Column::AttemptCount).add(1),
            )
            .col_expr(
                pending_operations::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(pending_operations::Column::Id.eq(entry_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(QueueError::NotFound(entry_id));
        }

        Ok(())
    }

    /// Number of queued entries for an owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn count_pending(&self, owner_id: Uuid) -> Result<u64, QueueError> {
        let count = pending_operations::Entity::find()
            .filter(pending_operations::Column::OwnerId.eq(owner_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Owners that currently have queued entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub async fn pending_owners(&self) -> Result<Vec<Uuid>, QueueError> {
        let owners = pending_operations::Entity::find()
            .select_only()
            .column(pending_operations::Column::OwnerId)
            .distinct()
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await?;

        Ok(owners)
    }
}

// ============================================================================
// Payload codec
// ============================================================================

/// Serializes a payload for storage.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized.
pub fn encode_payload(payload: &OfflinePayload) -> Result<String, QueueError> {
    Ok(serde_json::to_string(payload)?)
}

/// Deserializes the payload of a stored entry.
///
/// # Errors
///
/// Returns an error if the stored JSON does not parse as a payload.
pub fn decode_payload(entry: &pending_operations::Model) -> Result<OfflinePayload, QueueError> {
    Ok(serde_json::from_str(&entry.payload)?)
}
