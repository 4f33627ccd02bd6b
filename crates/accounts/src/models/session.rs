//! Session-stored identity.

use serde::{Deserialize, Serialize};

use greenleaf_core::{Email, UserId};

use super::user::User;

/// The logged-in account, as kept in the session.
///
/// The flags are a snapshot taken at login. Access checks go by `id` and
/// reload the account instead of trusting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub is_staff: bool,
    pub is_active: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_staff: user.is_staff,
            is_active: user.is_active,
        }
    }
}

/// Session keys for account data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
