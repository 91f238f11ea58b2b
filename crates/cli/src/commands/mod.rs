//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod tokens;

use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by commands that connect to the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the Partshed database.
///
/// Reads `PARTSHED_DATABASE_URL`, falling back to `DATABASE_URL`,
/// matching the server's configuration.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PARTSHED_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| ConnectError::MissingEnvVar("PARTSHED_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}
