//! Database operations for user accounts.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use partshed_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// A user joined with their password hash, for credential verification only.
/// Never serialized.
#[derive(Debug)]
pub struct AuthRecord {
    pub user: User,
    pub password_hash: String,
}

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for AuthRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let role = row
            .role
            .parse::<UserRole>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        Ok(Self {
            user: User {
                id: UserId::new(row.id),
                username: row.username,
                email,
                role,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

/// Fields of a profile update that survived validation, hash already
/// computed. Fields left `None` are not touched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// True when a user already holds this email or username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_with_email_or_username(
        &self,
        email: &Email,
        username: &str,
    ) -> Result<bool, RepositoryError> {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT id FROM users WHERE email = $1 OR username = $2 LIMIT 1")
                .bind(email.as_str())
                .bind(username)
                .fetch_optional(self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Create a user account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the email or username is
    /// already taken (a concurrent register can slip past the existence
    /// check), or `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(username)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict("User already exists".to_owned())
            }
            _ => RepositoryError::Database(e),
        })?;

        Ok(AuthRecord::try_from(row)?.user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        row.map(|r| AuthRecord::try_from(r).map(|record| record.user))
            .transpose()
    }

    /// Get a user with their password hash for login verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AuthRecord>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Apply a partial profile update. Username and email are checked for
    /// collisions against all *other* rows before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist,
    /// `RepositoryError::Conflict` on a username/email collision, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError> {
        let current = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        if changes.is_empty() {
            return Ok(current);
        }

        if let Some(username) = &changes.username {
            let taken: Option<i32> =
                sqlx::query_scalar("SELECT id FROM users WHERE username = $1 AND id != $2")
                    .bind(username)
                    .bind(id.as_i32())
                    .fetch_optional(self.pool)
                    .await?;
            if taken.is_some() {
                return Err(RepositoryError::Conflict("Username already taken".to_owned()));
            }
        }
        if let Some(email) = &changes.email {
            let taken: Option<i32> =
                sqlx::query_scalar("SELECT id FROM users WHERE email = $1 AND id != $2")
                    .bind(email.as_str())
                    .bind(id.as_i32())
                    .fetch_optional(self.pool)
                    .await?;
            if taken.is_some() {
                return Err(RepositoryError::Conflict("Email already in use".to_owned()));
            }
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE users SET ");
        let mut assignments = builder.separated(", ");
        if let Some(username) = &changes.username {
            assignments
                .push("username = ")
                .push_bind_unseparated(username.clone());
        }
        if let Some(email) = &changes.email {
            assignments
                .push("email = ")
                .push_bind_unseparated(email.as_str().to_owned());
        }
        if let Some(password_hash) = &changes.password_hash {
            assignments
                .push("password_hash = ")
                .push_bind_unseparated(password_hash.clone());
        }
        assignments.push("updated_at = NOW()");
        builder.push(" WHERE id = ").push_bind(id.as_i32());
        builder.push(" RETURNING ").push(USER_COLUMNS);

        let row: UserRow = builder.build_query_as().fetch_one(self.pool).await?;
        Ok(AuthRecord::try_from(row)?.user)
    }
}
