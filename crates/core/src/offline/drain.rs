//! Drain ordering for queued intents.
//!
//! The reconciler drains creates, then updates, then deletes; entries within
//! a group replay in enqueue order. There is no cross-group ordering
//! guarantee beyond the group sequence itself.

use serde::{Deserialize, Serialize};

/// The mutation class of a queued intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Creates a new entity.
    Create,
    /// Edits an existing entity.
    Update,
    /// Removes an existing entity.
    Delete,
}

impl OpKind {
    /// Position of this group in the drain sequence.
    #[must_use]
    pub const fn drain_rank(self) -> u8 {
        match self {
            Self::Create => 0,
            Self::Update => 1,
            Self::Delete => 2,
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("Unknown op kind: {s}")),
        }
    }
}

/// The entity family a queued intent targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An expense transaction.
    Expense,
    /// An income transaction.
    Income,
    /// An installment plan.
    Installment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Installment => "installment",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "installment" => Ok(Self::Installment),
            _ => Err(format!("Unknown entity kind: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_creates_drain_before_updates_before_deletes() {
        assert!(OpKind::Create.drain_rank() < OpKind::Update.drain_rank());
        assert!(OpKind::Update.drain_rank() < OpKind::Delete.drain_rank());
    }

    #[test]
    fn test_drain_sort_orders_groups_then_enqueue_time() {
        // (op, enqueue tick) pairs in arrival order.
        let mut entries = vec![
            (OpKind::Delete, 1),
            (OpKind::Create, 3),
            (OpKind::Update, 2),
            (OpKind::Create, 1),
            (OpKind::Delete, 0),
        ];
        entries.sort_by_key(|(op, at)| (op.drain_rank(), *at));

        assert_eq!(
            entries,
            vec![
                (OpKind::Create, 1),
                (OpKind::Create, 3),
                (OpKind::Update, 2),
                (OpKind::Delete, 0),
                (OpKind::Delete, 1),
            ]
        );
    }

    #[test]
    fn test_op_kind_round_trip() {
        for op in [OpKind::Create, OpKind::Update, OpKind::Delete] {
            assert_eq!(OpKind::from_str(&op.to_string()).unwrap(), op);
        }
        assert!(OpKind::from_str("upsert").is_err());
    }

    #[test]
    fn test_entity_kind_round_trip() {
        for kind in [EntityKind::Expense, EntityKind::Income, EntityKind::Installment] {
            assert_eq!(EntityKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert!(EntityKind::from_str("transfer").is_err());
    }
}
