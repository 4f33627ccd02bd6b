//! Greenleaf Accounts library.
//!
//! Business rules around storefront accounts:
//! - Address book management and default billing/shipping addresses
//! - Staff account removal and the staff-only route guard
//! - Superuser bootstrap with stock avatars and queued thumbnails
//!
//! Persistence is `PostgreSQL` (schema `account`); see [`db`] and the
//! migrations embedded in [`MIGRATOR`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

/// Embedded migrations for the `account` schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
