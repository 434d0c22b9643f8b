//! `SeaORM` Entity for the pending_operations table (device-local SQLite).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::QueueEntryStatus;

/// A durably queued offline mutation awaiting replay.
///
/// `payload` is the JSON serialization of `kasku_core::offline::OfflinePayload`;
/// `op_kind` and `entity_kind` are derived from it at enqueue time and exist
/// only for indexing and inspection. The row id doubles as the replay key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub op_kind: String,
    pub entity_kind: String,
    pub payload: String,
    pub status: QueueEntryStatus,
    pub last_error: Option<String>,
    pub attempt_count: i32,
    pub enqueued_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
