//! Staff account lifecycle.

use std::fmt;

use sqlx::PgPool;
use tracing::info;

use super::AccountError;
use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// What happened to a removed staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRemoval {
    /// The account has orders, so it was kept as a plain customer with
    /// staff status and permissions revoked.
    Demoted,
    /// The account had no orders and was deleted.
    Deleted,
}

impl fmt::Display for StaffRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Demoted => "demoted to customer",
            Self::Deleted => "deleted",
        })
    }
}

/// Staff account management.
pub struct StaffService<'a> {
    users: UserRepository<'a>,
}

impl<'a> StaffService<'a> {
    /// Create a new staff service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Remove a staff member.
    ///
    /// Orders must keep pointing at the account that placed them, so an
    /// account with orders is only demoted; one without is deleted.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserNotFound` if the account no longer exists.
    /// Returns `AccountError::Repository` if a database operation fails.
    pub async fn remove_staff_member(&self, staff: User) -> Result<StaffRemoval, AccountError> {
        let outcome = if self.users.has_orders(staff.id).await? {
            self.users.demote_staff(staff.id).await.map_err(not_found)?;
            StaffRemoval::Demoted
        } else {
            self.users.delete(staff.id).await.map_err(not_found)?;
            StaffRemoval::Deleted
        };

        info!(user_id = %staff.id, email = %staff.email, %outcome, "staff member removed");
        Ok(outcome)
    }
}

fn not_found(e: RepositoryError) -> AccountError {
    match e {
        RepositoryError::NotFound => AccountError::UserNotFound,
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_display() {
        assert_eq!(StaffRemoval::Demoted.to_string(), "demoted to customer");
        assert_eq!(StaffRemoval::Deleted.to_string(), "deleted");
    }

    #[test]
    fn test_missing_row_maps_to_user_not_found() {
        assert!(matches!(
            not_found(RepositoryError::NotFound),
            AccountError::UserNotFound
        ));
        assert!(matches!(
            not_found(RepositoryError::Conflict("x".to_owned())),
            AccountError::Repository(RepositoryError::Conflict(_))
        ));
    }
}
