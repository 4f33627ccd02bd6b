//! User repository for database operations.
//!
//! Covers the account row itself, its default addresses, its permissions and
//! the order-existence check used when removing staff.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use greenleaf_core::{AddressId, AddressType, Email, PermissionId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::user::User;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    is_staff: bool,
    is_active: bool,
    is_superuser: bool,
    avatar: Option<String>,
    default_billing_address_id: Option<i32>,
    default_shipping_address_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_staff: row.is_staff,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            avatar: row.avatar,
            default_billing_address_id: row.default_billing_address_id.map(AddressId::new),
            default_shipping_address_id: row.default_shipping_address_id.map(AddressId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields for a brand-new superuser account.
#[derive(Debug)]
pub struct NewSuperuser<'a> {
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub avatar: Option<&'a str>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, last_name,
                   is_staff, is_active, is_superuser, avatar,
                   default_billing_address_id, default_shipping_address_id,
                   created_at, updated_at
            FROM account.user
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, last_name,
                   is_staff, is_active, is_superuser, avatar,
                   default_billing_address_id, default_shipping_address_id,
                   created_at, updated_at
            FROM account.user
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a plain customer account with no password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, email: &Email) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO account.user (email)
            VALUES ($1)
            RETURNING id, email, first_name, last_name,
                      is_staff, is_active, is_superuser, avatar,
                      default_billing_address_id, default_shipping_address_id,
                      created_at, updated_at
            "#,
        )
        .bind(email)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        row.try_into()
    }

    /// Insert an active staff superuser unless the email is already taken.
    ///
    /// Returns `None` when another account already owns the email; that
    /// account is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_superuser_if_absent(
        &self,
        new: NewSuperuser<'_>,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO account.user
                (email, is_active, is_staff, is_superuser, password_hash, avatar)
            VALUES ($1, TRUE, TRUE, TRUE, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, first_name, last_name,
                      is_staff, is_active, is_superuser, avatar,
                      default_billing_address_id, default_shipping_address_id,
                      created_at, updated_at
            "#,
        )
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.avatar)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the stored password hash for a user, if one is set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, Option<String>>(
            "SELECT password_hash FROM account.user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(hash.flatten())
    }

    /// Point one of the user's default addresses at `address_id`.
    ///
    /// Only that column (and `updated_at`) is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_default_address(
        &self,
        id: UserId,
        address_type: AddressType,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let sql = match address_type {
            AddressType::Billing => {
                "UPDATE account.user SET default_billing_address_id = $2, updated_at = NOW() WHERE id = $1"
            }
            AddressType::Shipping => {
                "UPDATE account.user SET default_shipping_address_id = $2, updated_at = NOW() WHERE id = $1"
            }
        };

        let result = sqlx::query(sql)
            .bind(id)
            .bind(address_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Whether any order references this user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_orders(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM account.customer_order WHERE user_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Revoke staff status and every direct permission in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if either statement fails.
    pub async fn demote_staff(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE account.user SET is_staff = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM account.user_permission WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a user. Address book links and permissions cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM account.user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Grant a permission by codename, creating the permission if needed.
    ///
    /// Granting a permission the user already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either statement fails.
    pub async fn grant_permission(&self, id: UserId, codename: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let permission_id = sqlx::query_scalar::<_, PermissionId>(
            r#"
            INSERT INTO account.permission (codename, name)
            VALUES ($1, $1)
            ON CONFLICT (codename) DO UPDATE SET codename = EXCLUDED.codename
            RETURNING id
            "#,
        )
        .bind(codename)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO account.user_permission (user_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(permission_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Codenames of the user's direct permissions, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn permission_codenames(&self, id: UserId) -> Result<Vec<String>, RepositoryError> {
        let codenames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.codename
            FROM account.permission p
            JOIN account.user_permission up ON up.permission_id = p.id
            WHERE up.user_id = $1
            ORDER BY p.codename
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(codenames)
    }
}
