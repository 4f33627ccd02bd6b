//! Domain models for accounts.

pub mod address;
pub mod session;
pub mod user;

pub use address::Address;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, display_first_name, display_last_name};
