//! Staff removal integration tests.
//!
//! Run with: `cargo test -p greenleaf-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use greenleaf_accounts::db::UserRepository;
use greenleaf_accounts::services::{AccountError, StaffRemoval, StaffService};
use greenleaf_integration_tests::{create_staff, place_order, reload, test_pool};

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_staff_without_orders_is_deleted() {
    let pool = test_pool().await;
    let staff = create_staff(&pool, "no-orders").await;
    let id = staff.id;

    let outcome = StaffService::new(&pool)
        .remove_staff_member(staff)
        .await
        .unwrap();

    assert_eq!(outcome, StaffRemoval::Deleted);
    assert!(reload(&pool, id).await.is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_staff_with_orders_is_demoted() {
    let pool = test_pool().await;
    let users = UserRepository::new(&pool);
    let staff = create_staff(&pool, "with-orders").await;
    let id = staff.id;

    users.grant_permission(id, "manage_orders").await.unwrap();
    users.grant_permission(id, "manage_products").await.unwrap();
    place_order(&pool, &staff).await;

    let outcome = StaffService::new(&pool)
        .remove_staff_member(staff)
        .await
        .unwrap();

    assert_eq!(outcome, StaffRemoval::Demoted);
    let demoted = reload(&pool, id).await.unwrap();
    assert!(!demoted.is_staff);
    assert!(demoted.is_active);
    assert!(users.permission_codenames(id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_removing_vanished_account() {
    let pool = test_pool().await;
    let staff = create_staff(&pool, "vanished").await;
    let service = StaffService::new(&pool);

    service.remove_staff_member(staff.clone()).await.unwrap();

    assert!(matches!(
        service.remove_staff_member(staff).await,
        Err(AccountError::UserNotFound)
    ));
}
