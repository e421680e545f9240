//! Integration tests for the transaction repository.

mod common;

use rust_decimal_macros::dec;
use tally_core::DomainError;
use tally_core::ledger::{Filter, NewTransaction, TransactionType};
use tally_db::{StoreError, TransactionRepository};
use tally_shared::types::{MerchantId, PageRequest};

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_transaction() {
    let db = common::setup().await;
    let merchant = common::create_merchant(&db, "acme", "Acme Corp").await;

    let booked = common::book(
        &db,
        merchant.merchant.id,
        dec!(120.5),
        TransactionType::Credit,
        "Invoice 7",
    )
    .await;

    assert_eq!(booked.transaction.amount, dec!(120.5));
    assert_eq!(booked.transaction.kind, TransactionType::Credit);
    assert_eq!(booked.transaction.merchant_id, merchant.merchant.id);
    assert_eq!(booked.merchant_username, "acme");
}

#[tokio::test]
async fn test_create_rejects_third_decimal_place() {
    let db = common::setup().await;
    let merchant = common::create_merchant(&db, "acme", "Acme Corp").await;

    let err = TransactionRepository::new(db)
        .create(NewTransaction {
            merchant_id: merchant.merchant.id,
            amount: dec!(19.999),
            kind: TransactionType::Credit,
            description: String::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn test_create_unknown_merchant() {
    let db = common::setup().await;

    let err = TransactionRepository::new(db)
        .create(NewTransaction {
            merchant_id: MerchantId::new(),
            amount: dec!(5),
            kind: TransactionType::Debit,
            description: String::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Domain(DomainError::NotFound("Merchant"))
    ));
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_newest_first_with_owner() {
    let db = common::setup().await;
    let merchant = common::create_merchant(&db, "acme", "Acme Corp").await;
    let id = merchant.merchant.id;

    common::book(&db, id, dec!(1), TransactionType::Credit, "one").await;
    common::tick().await;
    common::book(&db, id, dec!(2), TransactionType::Credit, "two").await;
    common::tick().await;
    common::book(&db, id, dec!(3), TransactionType::Debit, "three").await;

    let page = TransactionRepository::new(db)
        .list(None, Filter::Any, PageRequest::default())
        .await
        .expect("Failed to list transactions");

    let descriptions: Vec<_> = page
        .data
        .iter()
        .map(|t| t.transaction.description.as_str())
        .collect();
    assert_eq!(descriptions, ["three", "two", "one"]);
    assert!(page.data.iter().all(|t| t.merchant_username == "acme"));
    assert!(page.data.iter().all(|t| t.merchant.business_name == "Acme Corp"));
}

#[tokio::test]
async fn test_list_search_fields() {
    let db = common::setup().await;
    let acme = common::create_merchant(&db, "acme", "Acme Corp").await;
    let globex = common::create_merchant(&db, "globex", "Globex Industries").await;

    common::book(&db, acme.merchant.id, dec!(10), TransactionType::Credit, "rocket skates").await;
    common::book(&db, globex.merchant.id, dec!(20), TransactionType::Credit, "hammock").await;
    common::book(&db, globex.merchant.id, dec!(30), TransactionType::Debit, "refund").await;

    let repo = TransactionRepository::new(db);

    let by_username = repo
        .list(Some("ACME"), Filter::Any, PageRequest::default())
        .await
        .expect("Failed to list");
    assert_eq!(by_username.data.len(), 1);

    let by_business = repo
        .list(Some("industries"), Filter::Any, PageRequest::default())
        .await
        .expect("Failed to list");
    assert_eq!(by_business.data.len(), 2);

    let by_description = repo
        .list(Some("Hammock"), Filter::Any, PageRequest::default())
        .await
        .expect("Failed to list");
    assert_eq!(by_description.data.len(), 1);
    assert_eq!(by_description.data[0].merchant_username, "globex");

    let debits = repo
        .list(Some("globex"), Filter::Only(TransactionType::Debit), PageRequest::default())
        .await
        .expect("Failed to list");
    assert_eq!(debits.data.len(), 1);
    assert_eq!(debits.data[0].transaction.description, "refund");
}

#[tokio::test]
async fn test_list_search_wildcards_are_literal() {
    let db = common::setup().await;
    let merchant = common::create_merchant(&db, "acme", "Acme Corp").await;
    common::book(&db, merchant.merchant.id, dec!(1), TransactionType::Credit, "50% off").await;
    common::book(&db, merchant.merchant.id, dec!(1), TransactionType::Credit, "full price").await;

    let page = TransactionRepository::new(db)
        .list(Some("%"), Filter::Any, PageRequest::default())
        .await
        .expect("Failed to list");

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].transaction.description, "50% off");
}

#[tokio::test]
async fn test_list_unknown_type_matches_nothing() {
    let db = common::setup().await;
    let merchant = common::create_merchant(&db, "acme", "Acme Corp").await;
    common::book(&db, merchant.merchant.id, dec!(1), TransactionType::Credit, "x").await;

    let page = TransactionRepository::new(db)
        .list(None, Filter::parse(Some("refund")), PageRequest::default())
        .await
        .expect("Failed to list");
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_recent_is_scoped_and_limited() {
    let db = common::setup().await;
    let acme = common::create_merchant(&db, "acme", "Acme Corp").await;
    let globex = common::create_merchant(&db, "globex", "Globex").await;
    for _ in 0..7 {
        common::book(&db, acme.merchant.id, dec!(1), TransactionType::Credit, "").await;
    }
    common::book(&db, globex.merchant.id, dec!(1), TransactionType::Credit, "").await;

    let recent = TransactionRepository::new(db)
        .recent(Some(acme.merchant.id), 5)
        .await
        .expect("Failed to load recent");
    assert_eq!(recent.len(), 5);
    assert!(recent.iter().all(|t| t.merchant.id == acme.merchant.id));
}
