//! User summary command.

use greenleaf_accounts::services::{AddressBookService, ExtensionsManager};

use super::{CommandError, connect, find_user};

/// Show how the storefront would greet a user, and their account flags.
pub async fn show(email: &str) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;
    let user = find_user(&pool, email).await?;

    let extensions = ExtensionsManager::new();
    let book = AddressBookService::new(&pool, &extensions);
    let first_name = book.user_first_name(&user).await?;
    let last_name = book.user_last_name(&user).await?;

    tracing::info!("User {} ({})", user.id, user.email);
    tracing::info!(
        "  Name: {} {}",
        first_name.as_deref().unwrap_or("-"),
        last_name.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "  Active: {}, staff: {}, superuser: {}",
        user.is_active,
        user.is_staff,
        user.is_superuser
    );
    tracing::info!("  Avatar: {}", user.avatar.as_deref().unwrap_or("-"));
    Ok(())
}
