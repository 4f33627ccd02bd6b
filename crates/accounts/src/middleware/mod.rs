//! HTTP middleware and extractors.

pub mod staff;

pub use staff::{RequireStaff, StaffRejection, clear_current_user, set_current_user};
