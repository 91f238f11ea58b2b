//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! partshed-cli admin create -u shopboss -e boss@example.com -p 'hunter22'
//! ```
//!
//! # Environment Variables
//!
//! - `PARTSHED_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use thiserror::Error;

use partshed_core::{Email, EmailError, UserRole};

use super::ConnectError;

/// The API enforces the same minimum when registering through `/api/auth`.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Could not connect to the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Username is empty.
    #[error("Username cannot be empty")]
    EmptyUsername,

    /// Password is too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    Hash(String),

    /// User already exists.
    #[error("User already exists with username or email: {0}")]
    UserExists(String),
}

/// Create a new admin user.
///
/// Hashes the password with Argon2 and inserts the user with the `admin`
/// role. Fails if a user with the same username or email already exists.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(username: &str, email: &str, password: &str) -> Result<i32, AdminError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AdminError::EmptyUsername);
    }
    let email = Email::parse(email.trim())?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::PasswordTooShort);
    }

    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {} ({})", username, email);

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM users WHERE username = $1 OR email = $2")
            .bind(username)
            .bind(email.as_str())
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(AdminError::UserExists(format!("{username} / {email}")));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AdminError::Hash(e.to_string()))?
        .to_string();

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(username)
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(UserRole::Admin.as_str())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}, Email: {}",
        user_id,
        username,
        email
    );

    Ok(user_id)
}
