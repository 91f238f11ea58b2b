//! Database operations for the Partshed `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `items` - Inventory items (root of the cascade)
//! - `images` - Item photos, at most one primary per item
//! - `ocr_results` - Text extracted from uploaded photos
//! - `scrape_results` - Structured data captured from external sources
//! - `ecommerce_listings` - Listings published to external platforms
//! - `audit_log` - Append-only record of every mutation
//! - `users` / `auth_tokens` - Accounts and bearer credentials
//!
//! Item listing and partial updates assemble SQL at runtime with
//! [`sqlx::QueryBuilder`]; every user-supplied value is bound as a query
//! parameter, never interpolated into the statement text.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p partshed-cli -- migrate
//! ```

pub mod audit;
pub mod images;
pub mod items;
pub mod listings;
pub mod ocr_results;
pub mod scrape_results;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use audit::{AuditRepository, ChangeSet};
pub use images::ImageRepository;
pub use items::ItemRepository;
pub use listings::{ListingRepository, NewListing};
pub use ocr_results::OcrResultRepository;
pub use scrape_results::ScrapeResultRepository;
pub use tokens::AuthTokenRepository;
pub use users::{AuthRecord, UserChanges, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
