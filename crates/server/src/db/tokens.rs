//! Bearer token issuance and lookup.
//!
//! Tokens are opaque: 32 random bytes, URL-safe base64, stored server-side
//! with a fixed expiry. Authentication is a single indexed lookup joining
//! the owning user.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;

use partshed_core::{UserId, UserRole};

use super::RepositoryError;
use crate::models::CurrentUser;

/// How long an issued token stays valid.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Generate an opaque token string from 32 random bytes.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Repository for auth token database operations.
pub struct AuthTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthTokenRepository<'a> {
    /// Create a new auth token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Issue a fresh token for the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: UserId) -> Result<String, RepositoryError> {
        let token = generate_token();
        let expires_at: DateTime<Utc> = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);

        sqlx::query("INSERT INTO auth_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(user_id.as_i32())
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(token)
    }

    /// Resolve a presented token to its user, ignoring expired tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` on an unknown stored role.
    pub async fn authenticate(&self, token: &str) -> Result<Option<CurrentUser>, RepositoryError> {
        let row: Option<(i32, String)> = sqlx::query_as(
            r"
            SELECT u.id, u.role
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1 AND t.expires_at > NOW()
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(|(id, role)| {
            let role = role
                .parse::<UserRole>()
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            Ok(CurrentUser {
                id: UserId::new(id),
                role,
            })
        })
        .transpose()
    }

    /// Drop expired rows. Called opportunistically; correctness never
    /// depends on it because `authenticate` filters on expiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn prune_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= NOW()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_url_safe_and_unpadded() {
        let token = generate_token();
        // 32 bytes -> 43 base64 chars without padding.
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_expiry_is_in_the_future() {
        let expires_at = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
        assert!(expires_at > Utc::now() + Duration::hours(23));
    }
}
