//! Superuser bootstrap.
//!
//! Used by development tooling and first-run setup to guarantee that an
//! administrator account exists.

use std::fmt;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::{error, info, warn};

use greenleaf_core::Email;

use super::storage::{self, AVATAR_UPLOAD_TO, MediaStorage};
use super::thumbnails::{AVATAR_ATTR, USER_AVATARS};
use super::{AccountError, ThumbnailService, password};
use crate::db::UserRepository;
use crate::db::users::NewSuperuser;

/// Login details for the superuser to create.
#[derive(Debug, Clone)]
pub struct SuperuserCredentials {
    pub email: String,
    pub password: SecretString,
}

/// Result of [`SuperuserService::create_superuser`].
///
/// `Display` renders the message shown to whoever ran the bootstrap. The
/// email is echoed as it was entered, not in its stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuperuserOutcome {
    /// A new account was created with these credentials.
    Created { email: String, password: String },
    /// An account with this email already existed and was left alone.
    AlreadyExists { email: String },
}

impl fmt::Display for SuperuserOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { email, password } => write!(f, "Superuser - {email}/{password}"),
            Self::AlreadyExists { email } => write!(f, "Superuser already exists - {email}"),
        }
    }
}

/// Creates superuser accounts.
pub struct SuperuserService<'a> {
    users: UserRepository<'a>,
    thumbnails: ThumbnailService<'a>,
    storage: &'a MediaStorage,
    avatars_dir: &'a Path,
}

impl<'a> SuperuserService<'a> {
    /// Create a new superuser service.
    ///
    /// `avatars_dir` is the pool new superusers get a random avatar from.
    #[must_use]
    pub const fn new(pool: &'a PgPool, storage: &'a MediaStorage, avatars_dir: &'a Path) -> Self {
        Self {
            users: UserRepository::new(pool),
            thumbnails: ThumbnailService::new(pool),
            storage,
            avatars_dir,
        }
    }

    /// Get or create an active staff superuser for `credentials.email`.
    ///
    /// A new account gets a random avatar from the pool, the hashed
    /// password, and its avatar thumbnails queued. An existing account with
    /// the same email is not modified. Failing to queue thumbnails is logged
    /// but does not undo or fail the creation.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` for a malformed email,
    /// `AccountError::Storage` if the avatar cannot be copied, and
    /// `AccountError::Repository` if a database operation fails.
    pub async fn create_superuser(
        &self,
        credentials: &SuperuserCredentials,
    ) -> Result<SuperuserOutcome, AccountError> {
        let entered = credentials.email.trim().to_owned();
        let email = Email::normalize(&entered)?;

        if self.users.get_by_email(&email).await?.is_some() {
            info!(%email, "superuser already exists");
            return Ok(SuperuserOutcome::AlreadyExists { email: entered });
        }

        let password_hash = password::hash_password(credentials.password.expose_secret())?;
        let avatar = self.store_random_avatar().await?;

        let created = self
            .users
            .insert_superuser_if_absent(NewSuperuser {
                email: &email,
                password_hash: &password_hash,
                avatar: avatar.as_deref(),
            })
            .await;

        let user = match created {
            Ok(Some(user)) => user,
            Ok(None) => {
                // Lost a race with a concurrent insert of the same email.
                self.discard_avatar(avatar.as_deref()).await;
                info!(%email, "superuser already exists");
                return Ok(SuperuserOutcome::AlreadyExists { email: entered });
            }
            Err(e) => {
                self.discard_avatar(avatar.as_deref()).await;
                return Err(e.into());
            }
        };

        // The account is committed; reruns report it as existing.
        if let Err(e) = self
            .thumbnails
            .create_thumbnails(user.id, USER_AVATARS, AVATAR_ATTR)
            .await
        {
            error!(user_id = %user.id, error = %e, "failed to queue avatar thumbnails");
        }

        info!(user_id = %user.id, %email, "superuser created");
        Ok(SuperuserOutcome::Created {
            email: entered,
            password: credentials.password.expose_secret().to_owned(),
        })
    }

    async fn store_random_avatar(&self) -> Result<Option<String>, AccountError> {
        let Some(avatar) = storage::get_random_avatar(self.avatars_dir).await? else {
            warn!(dir = %self.avatars_dir.display(), "avatar pool is empty, creating superuser without avatar");
            return Ok(None);
        };

        let stored = self
            .storage
            .save(AVATAR_UPLOAD_TO, &avatar.name, &avatar.path)
            .await?;
        Ok(Some(stored))
    }

    async fn discard_avatar(&self, name: Option<&str>) {
        let Some(name) = name else { return };
        if let Err(e) = self.storage.delete(name).await {
            warn!(error = %e, name, "failed to remove unused avatar");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_message() {
        let outcome = SuperuserOutcome::Created {
            email: "admin@example.com".to_owned(),
            password: "admin".to_owned(),
        };
        assert_eq!(outcome.to_string(), "Superuser - admin@example.com/admin");
    }

    #[test]
    fn test_already_exists_message() {
        let outcome = SuperuserOutcome::AlreadyExists {
            email: "Admin@EXAMPLE.com".to_owned(),
        };
        assert_eq!(
            outcome.to_string(),
            "Superuser already exists - Admin@EXAMPLE.com"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = SuperuserCredentials {
            email: "admin@example.com".to_owned(),
            password: SecretString::from("hunter22".to_owned()),
        };
        assert!(!format!("{credentials:?}").contains("hunter22"));
    }
}
