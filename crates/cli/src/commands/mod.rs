//! CLI subcommands.

pub mod address;
pub mod migrate;
pub mod staff;
pub mod superuser;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use greenleaf_accounts::config::{AccountsConfig, ConfigError};
use greenleaf_accounts::db::{self, RepositoryError, UserRepository};
use greenleaf_accounts::models::User;
use greenleaf_accounts::services::AccountError;
use greenleaf_core::{Email, EmailError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Account operation error.
    #[error("{0}")]
    Account(#[from] AccountError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid command input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No account with this email.
    #[error("No user with email: {0}")]
    UserNotFound(Email),
}

/// Load configuration and connect to the account database.
pub(crate) async fn connect() -> Result<(AccountsConfig, PgPool), CommandError> {
    let config = AccountsConfig::from_env()?;

    tracing::info!("Connecting to account database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, pool))
}

/// Look up a user by email or fail with `UserNotFound`.
pub(crate) async fn find_user(pool: &PgPool, email: &str) -> Result<User, CommandError> {
    let email = Email::normalize(email)?;
    UserRepository::new(pool)
        .get_by_email(&email)
        .await?
        .ok_or(CommandError::UserNotFound(email))
}
