//! Core account types.

pub mod address;
pub mod email;
pub mod id;
pub mod rendition;

pub use address::{AddressData, AddressType, AddressTypeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use rendition::{RenditionKey, RenditionKeyError, RenditionOp};
