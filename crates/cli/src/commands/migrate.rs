//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! partshed-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PARTSHED_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded into
//! this binary at compile time, so a deployed CLI does not need the
//! source tree next to it.

use thiserror::Error;

use super::ConnectError;

/// Errors that can occur while running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Could not connect to the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending database migrations.
pub async fn run() -> Result<(), MigrationError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
