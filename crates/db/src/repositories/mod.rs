//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for store operations, hiding the
//! `SeaORM` implementation details from the rest of the application. The
//! ledger repository is the only code that writes account balances; the
//! installment repository composes it for period payments; the queue
//! repository runs against the device-local SQLite store.

pub mod account;
pub mod installment;
pub mod ledger;
pub mod queue;

pub use account::{
    AccountDeletion, AccountFilter, AccountRepository, CreateAccountInput, UpdateAccountInput,
};
pub use installment::{
    CreateInstallmentInput, InstallmentFilter, InstallmentRepository, InstallmentSnapshot,
    PayPeriodsInput, PaymentReceipt, UpdateInstallmentInput,
};
pub use ledger::{
    LedgerReceipt, LedgerRepository, TransactionEditInput, TransactionFilter, TransactionMeta,
    TransferReceipt,
};
pub use queue::{QueueError, QueueRepository};
