//! Store seeder for Kasku development and testing.
//!
//! Seeds a demo owner with money accounts, a category set, and a sample
//! installment plan for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::str::FromStr;
use uuid::Uuid;

use kasku_db::entities::{
    accounts, categories,
    sea_orm_active_enums::{AccountKind, CategoryKind},
};
use kasku_db::repositories::{CreateInstallmentInput, InstallmentRepository};
use kasku_shared::types::{Currency, Money};

/// Demo owner ID (consistent for all seeds)
const DEMO_OWNER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Replay key for the sample installment, so re-runs can find it
const DEMO_INSTALLMENT_KEY: &str = "00000000-0000-0000-0000-000000000301";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to store of record...");
    let db = kasku_db::connect(&database_url)
        .await
        .expect("Failed to connect to store of record");

    println!("Seeding demo accounts...");
    seed_accounts(&db).await;

    println!("Seeding categories...");
    seed_categories(&db).await;

    println!("Seeding sample installment...");
    seed_installment(&db).await;

    println!("Seeding complete!");
}

fn demo_owner_id() -> Uuid {
    Uuid::parse_str(DEMO_OWNER_ID).unwrap()
}

/// Seeds three demo accounts with opening balances.
async fn seed_accounts(db: &DatabaseConnection) {
    let accounts_data = [
        (
            "00000000-0000-0000-0000-000000000101",
            "Main Checking",
            AccountKind::Bank,
            "5000000.00",
        ),
        (
            "00000000-0000-0000-0000-000000000102",
            "Wallet",
            AccountKind::Cash,
            "350000.00",
        ),
        (
            "00000000-0000-0000-0000-000000000103",
            "GoPay",
            AccountKind::EWallet,
            "150000.00",
        ),
    ];

    let mut inserted = 0;
    for (id, name, kind, balance) in accounts_data {
        let account_id = Uuid::parse_str(id).unwrap();

        // Skip accounts that already exist so re-runs stay clean
        if accounts::Entity::find_by_id(account_id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Account {name} already exists, skipping...");
            continue;
        }

        let account = accounts::ActiveModel {
            id: Set(account_id),
            owner_id: Set(demo_owner_id()),
            name: Set(name.to_string()),
            kind: Set(kind),
            balance: Set(Decimal::from_str(balance).unwrap()),
            is_active: Set(true),
            version: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = account.insert(db).await {
            eprintln!("Failed to insert account {name}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} accounts");
}

/// Seeds the default expense and income categories.
async fn seed_categories(db: &DatabaseConnection) {
    let categories_data = [
        (
            "00000000-0000-0000-0000-000000000201",
            "Food & Dining",
            CategoryKind::Expense,
        ),
        (
            "00000000-0000-0000-0000-000000000202",
            "Transport",
            CategoryKind::Expense,
        ),
        (
            "00000000-0000-0000-0000-000000000203",
            "Utilities",
            CategoryKind::Expense,
        ),
        (
            "00000000-0000-0000-0000-000000000204",
            "Entertainment",
            CategoryKind::Expense,
        ),
        (
            "00000000-0000-0000-0000-000000000205",
            "Health",
            CategoryKind::Expense,
        ),
        (
            "00000000-0000-0000-0000-000000000206",
            "Groceries",
            CategoryKind::Expense,
        ),
        (
            "00000000-0000-0000-0000-000000000207",
            "Salary",
            CategoryKind::Income,
        ),
        (
            "00000000-0000-0000-0000-000000000208",
            "Bonus",
            CategoryKind::Income,
        ),
        (
            "00000000-0000-0000-0000-000000000209",
            "Interest",
            CategoryKind::Income,
        ),
    ];

    let mut inserted = 0;
    for (id, name, kind) in categories_data {
        let category_id = Uuid::parse_str(id).unwrap();

        if categories::Entity::find_by_id(category_id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            continue;
        }

        let category = categories::ActiveModel {
            id: Set(category_id),
            owner_id: Set(demo_owner_id()),
            name: Set(name.to_string()),
            kind: Set(kind),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = category.insert(db).await {
            eprintln!("Failed to insert category {name}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} categories");
}

/// Seeds a sample installment plan through the repository so the schedule
/// math matches what the API would produce.
async fn seed_installment(db: &DatabaseConnection) {
    let repo = InstallmentRepository::new(db.clone());
    let replay_key = Uuid::parse_str(DEMO_INSTALLMENT_KEY).unwrap();

    match repo.find_by_replay_key(demo_owner_id(), replay_key).await {
        Ok(Some(_)) => {
            println!("  Sample installment already exists, skipping...");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Failed to check for sample installment: {e}");
            return;
        }
    }

    let input = CreateInstallmentInput {
        owner_id: demo_owner_id(),
        title: "Laptop installment".to_string(),
        principal: Decimal::from_str("6000000.00").unwrap(),
        term_count: 12,
        periodic_rate_percent: Decimal::from_str("2").unwrap(),
        due_date: Utc::now().date_naive() + Duration::days(365),
        notes: Some("Seeded demo plan".to_string()),
        replay_key: Some(replay_key),
    };

    match repo.create_installment(input).await {
        Ok(snapshot) => {
            // Console output is a display surface, so the per-period amount
            // gets the half-up rounding stored values never do.
            let per_period = Money::new(snapshot.schedule.period_amount, Currency::Idr);
            println!(
                "  Created sample installment: {} ({} periods of IDR {})",
                snapshot.installment.title,
                snapshot.installment.term_count,
                per_period.rounded_for_display()
            );
        }
        Err(e) => eprintln!("Failed to insert sample installment: {e}"),
    }
}
