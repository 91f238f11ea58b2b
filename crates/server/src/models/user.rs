//! User account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use partshed_core::{Email, UserId, UserRole};

/// A user account as exposed over the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// The authenticated actor resolved from a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: UserRole,
}

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Profile update bag. Fields left `None` are not touched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserInput {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}
