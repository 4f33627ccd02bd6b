//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! gl-cli migrate
//! ```
//!
//! Migration files live in `crates/accounts/migrations/` and are embedded
//! into the binary at build time.

use super::{CommandError, connect};

/// Run all pending account migrations.
pub async fn run() -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running account migrations...");
    greenleaf_accounts::MIGRATOR.run(&pool).await?;

    tracing::info!("Account migrations complete!");
    Ok(())
}
