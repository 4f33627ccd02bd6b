//! Superuser bootstrap command.
//!
//! # Usage
//!
//! ```bash
//! gl-cli superuser create -e admin@example.com -p admin
//! ```

use secrecy::SecretString;

use greenleaf_accounts::services::storage::MediaStorage;
use greenleaf_accounts::services::{SuperuserCredentials, SuperuserService};

use super::{CommandError, connect};

/// Create a superuser, or report that the email is already taken.
pub async fn create(email: String, password: String) -> Result<(), CommandError> {
    let (config, pool) = connect().await?;
    let storage = MediaStorage::new(config.media_root.clone());

    let credentials = SuperuserCredentials {
        email,
        password: SecretString::from(password),
    };

    let outcome = SuperuserService::new(&pool, &storage, &config.avatars_path)
        .create_superuser(&credentials)
        .await?;

    tracing::info!("{outcome}");
    Ok(())
}
