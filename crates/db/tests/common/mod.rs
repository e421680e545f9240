//! Shared setup for repository integration tests.
//!
//! Every test gets its own in-memory SQLite database migrated with the real
//! migrator.

#![allow(dead_code)]

use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tally_core::ledger::{
    MerchantInput, MerchantStatus, MerchantWithOwner, NewTransaction, TransactionType,
    TransactionWithMerchant,
};
use tally_db::migration::{Migrator, MigratorTrait};
use tally_db::{MerchantRepository, TransactionRepository};
use tally_shared::types::MerchantId;

/// Connects to a fresh, migrated in-memory database.
pub async fn setup() -> DatabaseConnection {
    // One connection: every pooled connection would get its own memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// A valid merchant form for `username`.
pub fn merchant_input(username: &str, business_name: &str, status: MerchantStatus) -> MerchantInput {
    MerchantInput {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Test".to_string(),
        last_name: "Owner".to_string(),
        password: Some("merchant-pass".to_string()),
        business_name: business_name.to_string(),
        business_address: None,
        status,
    }
}

/// Creates an active merchant.
pub async fn create_merchant(
    db: &DatabaseConnection,
    username: &str,
    business_name: &str,
) -> MerchantWithOwner {
    create_merchant_with_status(db, username, business_name, MerchantStatus::Active).await
}

/// Creates a merchant with the given status.
pub async fn create_merchant_with_status(
    db: &DatabaseConnection,
    username: &str,
    business_name: &str,
    status: MerchantStatus,
) -> MerchantWithOwner {
    MerchantRepository::new(db.clone())
        .create(merchant_input(username, business_name, status))
        .await
        .expect("Failed to create merchant")
}

/// Records a booking.
pub async fn book(
    db: &DatabaseConnection,
    merchant_id: MerchantId,
    amount: Decimal,
    kind: TransactionType,
    description: &str,
) -> TransactionWithMerchant {
    TransactionRepository::new(db.clone())
        .create(NewTransaction {
            merchant_id,
            amount,
            kind,
            description: description.to_string(),
        })
        .await
        .expect("Failed to record transaction")
}

/// Keeps consecutive inserts on distinct timestamps.
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(3)).await;
}
