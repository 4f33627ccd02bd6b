//! Account services.
//!
//! Each service borrows the pool and whatever collaborators it needs, and
//! turns one business rule into a short sequence of repository calls.

mod error;

pub mod address_book;
pub mod extensions;
pub mod password;
pub mod staff;
pub mod storage;
pub mod superuser;
pub mod thumbnails;

pub use address_book::AddressBookService;
pub use error::AccountError;
pub use extensions::{AccountPlugin, AddressNormalizer, ExtensionsManager};
pub use staff::{StaffRemoval, StaffService};
pub use storage::{MediaStorage, StorageError};
pub use superuser::{SuperuserCredentials, SuperuserOutcome, SuperuserService};
pub use thumbnails::ThumbnailService;
