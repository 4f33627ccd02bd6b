//! Superuser bootstrap integration tests.
//!
//! Run with: `cargo test -p greenleaf-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use std::fs;

use secrecy::SecretString;

use greenleaf_accounts::db::{ThumbnailJobRepository, UserRepository};
use greenleaf_accounts::services::{
    MediaStorage, SuperuserCredentials, SuperuserOutcome, SuperuserService, password,
};
use greenleaf_integration_tests::{create_customer, test_pool, unique_email};

fn credentials(email: &str) -> SuperuserCredentials {
    SuperuserCredentials {
        email: email.to_owned(),
        password: SecretString::from("admin".to_owned()),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_create_superuser_once() {
    let pool = test_pool().await;
    let media = tempfile::tempdir().unwrap();
    let avatars = tempfile::tempdir().unwrap();
    fs::write(avatars.path().join("avatar1.jpg"), b"jpeg").unwrap();

    let storage = MediaStorage::new(media.path());
    let service = SuperuserService::new(&pool, &storage, avatars.path());
    let email = unique_email("admin");

    let outcome = service
        .create_superuser(&credentials(email.as_str()))
        .await
        .unwrap();
    assert_eq!(
        outcome.to_string(),
        format!("Superuser - {email}/admin")
    );

    let users = UserRepository::new(&pool);
    let user = users.get_by_email(&email).await.unwrap().unwrap();
    assert!(user.is_superuser);
    assert!(user.is_staff);
    assert!(user.is_active);

    let avatar = user.avatar.clone().unwrap();
    assert!(avatar.starts_with("user-avatars/avatar1"));
    assert!(storage.path(&avatar).is_file());

    let hash = users.get_password_hash(user.id).await.unwrap().unwrap();
    assert!(password::verify_password("admin", &hash));

    let jobs = ThumbnailJobRepository::new(&pool)
        .list_pending_for_user(user.id)
        .await
        .unwrap();
    assert_eq!(jobs.len(), 1);
    let job = jobs.first().unwrap();
    assert_eq!(job.source_path, avatar);
    assert_eq!(job.rendition_key, "thumbnail__445x445");

    let again = service
        .create_superuser(&credentials(email.as_str()))
        .await
        .unwrap();
    assert_eq!(
        again,
        SuperuserOutcome::AlreadyExists {
            email: email.to_string()
        }
    );
    assert_eq!(
        again.to_string(),
        format!("Superuser already exists - {email}")
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_existing_email_matches_after_normalization() {
    let pool = test_pool().await;
    let media = tempfile::tempdir().unwrap();
    let avatars = tempfile::tempdir().unwrap();
    let storage = MediaStorage::new(media.path());
    let service = SuperuserService::new(&pool, &storage, avatars.path());
    let email = unique_email("mixed");

    service
        .create_superuser(&credentials(email.as_str()))
        .await
        .unwrap();

    let shouty = format!("{}@EXAMPLE.COM", email.local_part());
    let outcome = service
        .create_superuser(&credentials(&format!("  {shouty} ")))
        .await
        .unwrap();
    assert_eq!(
        outcome.to_string(),
        format!("Superuser already exists - {shouty}")
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_empty_avatar_pool() {
    let pool = test_pool().await;
    let media = tempfile::tempdir().unwrap();
    let avatars = tempfile::tempdir().unwrap();
    let storage = MediaStorage::new(media.path());
    let service = SuperuserService::new(&pool, &storage, avatars.path());
    let email = unique_email("no-avatar");

    service
        .create_superuser(&credentials(email.as_str()))
        .await
        .unwrap();

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.avatar, None);
    assert!(
        ThumbnailJobRepository::new(&pool)
            .list_pending_for_user(user.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_existing_customer_is_left_untouched() {
    let pool = test_pool().await;
    let media = tempfile::tempdir().unwrap();
    let avatars = tempfile::tempdir().unwrap();
    fs::write(avatars.path().join("avatar1.jpg"), b"jpeg").unwrap();
    let storage = MediaStorage::new(media.path());
    let service = SuperuserService::new(&pool, &storage, avatars.path());

    let customer = create_customer(&pool, "customer").await;

    let outcome = service
        .create_superuser(&credentials(customer.email.as_str()))
        .await
        .unwrap();
    assert!(matches!(outcome, SuperuserOutcome::AlreadyExists { .. }));

    let users = UserRepository::new(&pool);
    let after = users.get_by_id(customer.id).await.unwrap().unwrap();
    assert!(!after.is_staff);
    assert!(!after.is_superuser);
    assert!(after.is_active);
    assert_eq!(after.avatar, None);
    assert_eq!(after.updated_at, customer.updated_at);
    assert_eq!(users.get_password_hash(customer.id).await.unwrap(), None);
    assert!(
        ThumbnailJobRepository::new(&pool)
            .list_pending_for_user(customer.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(!media.path().join("user-avatars").exists());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ACCOUNTS_DATABASE_URL)"]
async fn test_thumbnail_queue_failure_keeps_superuser() {
    let pool = test_pool().await;

    // Reject thumbnail jobs for avatars named like this test's pool file.
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION account.reject_broken_thumbnail() RETURNS trigger AS $$
        BEGIN
            IF NEW.source_path LIKE '%broken-queue%' THEN
                RAISE EXCEPTION 'thumbnail queue unavailable';
            END IF;
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        r#"
        CREATE OR REPLACE TRIGGER reject_broken_thumbnail
        BEFORE INSERT ON account.thumbnail_job
        FOR EACH ROW EXECUTE FUNCTION account.reject_broken_thumbnail()
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let media = tempfile::tempdir().unwrap();
    let avatars = tempfile::tempdir().unwrap();
    fs::write(avatars.path().join("broken-queue.jpg"), b"jpeg").unwrap();
    let storage = MediaStorage::new(media.path());
    let service = SuperuserService::new(&pool, &storage, avatars.path());
    let email = unique_email("queue");

    let outcome = service
        .create_superuser(&credentials(email.as_str()))
        .await
        .unwrap();
    assert!(matches!(outcome, SuperuserOutcome::Created { .. }));

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await
        .unwrap()
        .unwrap();
    assert!(user.is_superuser);
    assert!(user.avatar.is_some());
    assert!(
        ThumbnailJobRepository::new(&pool)
            .list_pending_for_user(user.id)
            .await
            .unwrap()
            .is_empty()
    );
}
