//! Staff management commands.
//!
//! # Usage
//!
//! ```bash
//! gl-cli staff grant -e staff@example.com -p manage_orders
//! gl-cli staff remove -e staff@example.com
//! ```

use greenleaf_accounts::db::UserRepository;
use greenleaf_accounts::services::StaffService;

use super::{CommandError, connect, find_user};

/// Remove a staff member.
pub async fn remove(email: &str) -> Result<(), CommandError> {
    let (_, pool) = connect().await?;
    let staff = find_user(&pool, email).await?;

    if !staff.is_staff {
        return Err(CommandError::InvalidInput(format!(
            "{} is not a staff member",
            staff.email
        )));
    }

    let email = staff.email.clone();
    let outcome = StaffService::new(&pool).remove_staff_member(staff).await?;

    tracing::info!("Staff member {email} {outcome}");
    Ok(())
}

/// Grant a permission to a staff member.
pub async fn grant(email: &str, permission: &str) -> Result<(), CommandError> {
    let codename = permission.trim();
    if codename.is_empty() {
        return Err(CommandError::InvalidInput(
            "permission codename cannot be empty".to_owned(),
        ));
    }

    let (_, pool) = connect().await?;
    let staff = find_user(&pool, email).await?;

    if !staff.is_staff {
        return Err(CommandError::InvalidInput(format!(
            "{} is not a staff member",
            staff.email
        )));
    }

    let users = UserRepository::new(&pool);
    users.grant_permission(staff.id, codename).await?;

    let permissions = users.permission_codenames(staff.id).await?;
    tracing::info!("Permissions for {}: {}", staff.email, permissions.join(", "));
    Ok(())
}
