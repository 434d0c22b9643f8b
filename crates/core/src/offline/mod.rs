//! Offline mutation intents.
//!
//! Mutations attempted while the store of record is unreachable are recorded
//! as intents and replayed later by the sync reconciler. The payload is a
//! tagged enum, so each intent's required fields are statically enforced and
//! the queue's op/entity columns are derived from the variant rather than
//! supplied separately.

pub mod drain;
pub mod payload;

pub use drain::{EntityKind, OpKind};
pub use payload::{
    EntryDraft, InstallmentDraft, InstallmentEdit, InstallmentRef, InstallmentUpdate,
    OfflinePayload, PaymentDraft, TransactionEdit, TransactionRef,
};
