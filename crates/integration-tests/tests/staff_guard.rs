//! Staff guard integration tests.
//!
//! The guard must follow the account's current state, not the copy stored
//! in the session at login.
//!
//! Run with: `cargo test -p greenleaf-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::Request;
use sqlx::PgPool;
use tower_sessions::{MemoryStore, Session};

use greenleaf_accounts::middleware::{RequireStaff, StaffRejection, set_current_user};
use greenleaf_accounts::models::{CurrentUser, User};
use greenleaf_accounts::services::{StaffRemoval, StaffService};
use greenleaf_integration_tests::{create_customer, create_staff, place_order, test_pool};

/// A session logged in as `user`, as it was at login time.
async fn logged_in(user: &User) -> Session {
    let session = Session::new(None, Arc::new(MemoryStore::default()), None);
    set_current_user(&session, &CurrentUser::from(user)).await.unwrap();
    session
}

async fn guard(pool: &PgPool, session: &Session, uri: &str) -> Result<RequireStaff, StaffRejection> {
    let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
    parts.extensions.insert(session.clone());
    RequireStaff::from_request_parts(&mut parts, pool).await
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_active_staff_passes() {
    let pool = test_pool().await;
    let staff = create_staff(&pool, "guard-pass").await;
    let session = logged_in(&staff).await;

    let RequireStaff(current) = guard(&pool, &session, "/dashboard/").await.unwrap();
    assert_eq!(current.id, staff.id);
    assert!(current.is_staff);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_demoted_staff_is_rejected() {
    let pool = test_pool().await;
    let staff = create_staff(&pool, "guard-demoted").await;
    place_order(&pool, &staff).await;
    let session = logged_in(&staff).await;

    let outcome = StaffService::new(&pool)
        .remove_staff_member(staff)
        .await
        .unwrap();
    assert_eq!(outcome, StaffRemoval::Demoted);

    assert_eq!(
        guard(&pool, &session, "/dashboard/orders").await.err(),
        Some(StaffRejection::RedirectToLogin {
            next: "/dashboard/orders".to_owned()
        })
    );
    assert_eq!(
        guard(&pool, &session, "/api/staff").await.err(),
        Some(StaffRejection::Forbidden)
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_deleted_staff_is_rejected() {
    let pool = test_pool().await;
    let staff = create_staff(&pool, "guard-deleted").await;
    let session = logged_in(&staff).await;

    let outcome = StaffService::new(&pool)
        .remove_staff_member(staff)
        .await
        .unwrap();
    assert_eq!(outcome, StaffRemoval::Deleted);

    assert!(matches!(
        guard(&pool, &session, "/dashboard/").await,
        Err(StaffRejection::RedirectToLogin { .. })
    ));
    assert_eq!(
        guard(&pool, &session, "/api/staff").await.err(),
        Some(StaffRejection::Unauthorized)
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_session_flags_are_not_trusted() {
    let pool = test_pool().await;
    let customer = create_customer(&pool, "guard-forged").await;

    let mut forged = CurrentUser::from(&customer);
    forged.is_staff = true;
    let session = Session::new(None, Arc::new(MemoryStore::default()), None);
    set_current_user(&session, &forged).await.unwrap();

    assert_eq!(
        guard(&pool, &session, "/api/staff").await.err(),
        Some(StaffRejection::Forbidden)
    );
}
