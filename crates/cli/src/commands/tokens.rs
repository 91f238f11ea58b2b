//! Auth token maintenance commands.
//!
//! # Usage
//!
//! ```bash
//! partshed-cli tokens prune
//! ```
//!
//! Tokens expire 24 hours after issue but rows linger until pruned.
//! Intended to run on a schedule (cron or a Fly.io machine).

use thiserror::Error;

use super::ConnectError;

/// Errors that can occur while pruning tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Could not connect to the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Delete all expired auth tokens.
pub async fn prune() -> Result<(), TokenError> {
    let pool = super::connect().await?;

    let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= NOW()")
        .execute(&pool)
        .await?;

    tracing::info!("Pruned {} expired tokens", result.rows_affected());
    Ok(())
}
