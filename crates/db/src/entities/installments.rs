//! `SeaORM` Entity for the installments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InstallmentStatus;

/// An installment plan. Only the schedule INPUTS (principal, term count,
/// rate) and the progress fields are stored; periodic interest, total with
/// interest and period amount are recomputed on every read so progress math
/// always uses the unrounded values.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub principal: Decimal,
    pub term_count: i32,
    pub periodic_rate_percent: Decimal,
    pub due_date: Date,
    pub paid_periods: i32,
    pub total_paid: Decimal,
    pub remaining_amount: Decimal,
    pub status: InstallmentStatus,
    pub notes: Option<String>,
    pub replay_key: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installment_payments::Entity")]
    InstallmentPayments,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::installment_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallmentPayments.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
