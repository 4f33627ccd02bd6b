//! Greenleaf Core - Shared account types.
//!
//! Types used by every Greenleaf account component:
//! - `accounts` - Address book, staff lifecycle and superuser bootstrap
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! Nothing in this crate touches the network, the filesystem or a database.
//! Database encoding for the ID types is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, address values and rendition keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
