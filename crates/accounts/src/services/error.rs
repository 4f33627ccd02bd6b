//! Account service error types.

use thiserror::Error;

use crate::db::RepositoryError;

use super::storage::StorageError;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] greenleaf_core::EmailError),

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Address not found.
    #[error("address not found")]
    AddressNotFound,

    /// No rendition key set with this name.
    #[error("unknown thumbnail size set: {0}")]
    UnknownSizeSet(String),

    /// The model has no image field with this name.
    #[error("unknown image attribute: {0}")]
    UnknownImageAttr(String),

    /// A configured rendition key does not parse.
    #[error("invalid rendition key: {0}")]
    InvalidRenditionKey(#[from] greenleaf_core::RenditionKeyError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Media storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
