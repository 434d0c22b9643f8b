//! Integration tests for the offline operation queue.
//!
//! The queue store is device-local SQLite, so these tests run entirely
//! in-memory with no external services.

use chrono::NaiveDate;
use futures::future::join_all;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use kasku_core::offline::{
    EntryDraft, InstallmentUpdate, OfflinePayload, PaymentDraft, TransactionRef,
};
use kasku_db::entities::sea_orm_active_enums::QueueEntryStatus;
use kasku_db::queue_migration::QueueMigrator;
use kasku_db::repositories::queue::decode_payload;
use kasku_db::repositories::{QueueError, QueueRepository};
use kasku_shared::types::{AccountId, CategoryId, InstallmentId, TransactionId};

async fn queue_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);

    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory queue store");
    QueueMigrator::up(&db, None)
        .await
        .expect("Failed to migrate queue store");

    db
}

fn expense_payload(amount: rust_decimal::Decimal) -> OfflinePayload {
    OfflinePayload::CreateExpense(EntryDraft {
        account_id: AccountId::new(),
        category_id: CategoryId::new(),
        amount,
        date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        notes: Some("offline expense".to_string()),
    })
}

fn payment_payload() -> OfflinePayload {
    OfflinePayload::UpdateInstallment(InstallmentUpdate::PayPeriods(PaymentDraft {
        installment_id: InstallmentId::new(),
        periods_count: 2,
        account_id: AccountId::new(),
        date: NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
        notes: None,
    }))
}

// ============================================================================
// Test: Enqueue stores the payload and derives the kind columns
// ============================================================================
#[tokio::test]
async fn test_enqueue_stores_payload_and_kind_columns() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();

    let payload = expense_payload(dec!(75.50));
    let entry = repo.enqueue(owner_id, &payload).await.unwrap();

    assert_eq!(entry.owner_id, owner_id);
    assert_eq!(entry.op_kind, "create");
    assert_eq!(entry.entity_kind, "expense");
    assert_eq!(entry.status, QueueEntryStatus::Pending);
    assert_eq!(entry.attempt_count, 0);
    assert!(entry.last_error.is_none());
    assert_eq!(decode_payload(&entry).unwrap(), payload);
}

#[tokio::test]
async fn test_installment_payment_intent_round_trips() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();

    let payload = payment_payload();
    let entry = repo.enqueue(owner_id, &payload).await.unwrap();

    assert_eq!(entry.op_kind, "update");
    assert_eq!(entry.entity_kind, "installment");
    assert_eq!(decode_payload(&entry).unwrap(), payload);
}

// ============================================================================
// Test: Listing is oldest-first and scoped to the owner
// ============================================================================
#[tokio::test]
async fn test_list_pending_is_fifo_per_owner() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();
    let other_owner = Uuid::new_v4();

    let first = repo
        .enqueue(owner_id, &expense_payload(dec!(10)))
        .await
        .unwrap();
    let second = repo
        .enqueue(owner_id, &expense_payload(dec!(20)))
        .await
        .unwrap();
    repo.enqueue(other_owner, &expense_payload(dec!(99)))
        .await
        .unwrap();

    let entries = repo.list_pending(owner_id).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, first.id);
    assert_eq!(entries[1].id, second.id);
    assert!(entries[0].enqueued_at <= entries[1].enqueued_at);
}

// ============================================================================
// Test: Removal deletes the entry; a second removal reports NotFound
// ============================================================================
#[tokio::test]
async fn test_remove_deletes_entry() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();

    let entry = repo
        .enqueue(owner_id, &expense_payload(dec!(10)))
        .await
        .unwrap();

    repo.remove(entry.id).await.unwrap();
    assert_eq!(repo.count_pending(owner_id).await.unwrap(), 0);

    match repo.remove(entry.id).await {
        Err(QueueError::NotFound(id)) => assert_eq!(id, entry.id),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

// ============================================================================
// Test: A failed attempt is recorded but the entry stays queued
// ============================================================================
#[tokio::test]
async fn test_mark_failed_records_error_and_attempts() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();

    let entry = repo
        .enqueue(owner_id, &expense_payload(dec!(10)))
        .await
        .unwrap();

    repo.mark_failed(entry.id, "Account not found: test")
        .await
        .unwrap();
    repo.mark_failed(entry.id, "Account not found: test")
        .await
        .unwrap();

    let entries = repo.list_pending(owner_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, QueueEntryStatus::Failed);
    assert_eq!(entries[0].attempt_count, 2);
    assert_eq!(
        entries[0].last_error.as_deref(),
        Some("Account not found: test")
    );
}

#[tokio::test]
async fn test_mark_failed_unknown_entry_is_not_found() {
    let repo = QueueRepository::new(queue_db().await);

    assert!(matches!(
        repo.mark_failed(Uuid::new_v4(), "boom").await,
        Err(QueueError::NotFound(_))
    ));
}

// ============================================================================
// Test: Counting and owner discovery
// ============================================================================
#[tokio::test]
async fn test_count_pending_per_owner() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();
    let other_owner = Uuid::new_v4();

    repo.enqueue(owner_id, &expense_payload(dec!(1)))
        .await
        .unwrap();
    repo.enqueue(owner_id, &expense_payload(dec!(2)))
        .await
        .unwrap();
    repo.enqueue(other_owner, &expense_payload(dec!(3)))
        .await
        .unwrap();

    assert_eq!(repo.count_pending(owner_id).await.unwrap(), 2);
    assert_eq!(repo.count_pending(other_owner).await.unwrap(), 1);
    assert_eq!(repo.count_pending(Uuid::new_v4()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_pending_owners_lists_each_owner_once() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();

    repo.enqueue(owner_a, &expense_payload(dec!(1)))
        .await
        .unwrap();
    repo.enqueue(owner_a, &expense_payload(dec!(2)))
        .await
        .unwrap();
    repo.enqueue(owner_b, &expense_payload(dec!(3)))
        .await
        .unwrap();

    let mut owners = repo.pending_owners().await.unwrap();
    owners.sort();

    let mut expected = vec![owner_a, owner_b];
    expected.sort();
    assert_eq!(owners, expected);
}

// ============================================================================
// Test: Delete intents queue like any other
// ============================================================================
#[tokio::test]
async fn test_delete_intent_round_trips() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();

    let payload = OfflinePayload::DeleteExpense(TransactionRef {
        transaction_id: TransactionId::new(),
    });
    let entry = repo.enqueue(owner_id, &payload).await.unwrap();

    assert_eq!(entry.op_kind, "delete");
    assert_eq!(entry.entity_kind, "expense");
    assert_eq!(decode_payload(&entry).unwrap(), payload);
}

// ============================================================================
// Test: Concurrent enqueues all land durably
// ============================================================================
#[tokio::test]
async fn test_concurrent_enqueues_keep_every_entry() {
    let repo = QueueRepository::new(queue_db().await);
    let owner_id = Uuid::new_v4();

    const TASKS: usize = 20;
    let mut handles = Vec::with_capacity(TASKS);
    for i in 0..TASKS {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let amount = rust_decimal::Decimal::from(i + 1);
            repo.enqueue(owner_id, &expense_payload(amount)).await
        }));
    }

    for result in join_all(handles).await {
        result.expect("task panicked").expect("enqueue failed");
    }

    assert_eq!(repo.count_pending(owner_id).await.unwrap(), TASKS as u64);
    let entries = repo.list_pending(owner_id).await.unwrap();
    assert_eq!(entries.len(), TASKS);
}
