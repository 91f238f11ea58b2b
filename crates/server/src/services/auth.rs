//! Authentication service: registration, login, profile updates.
//!
//! Passwords are hashed with Argon2id. Sessions are opaque bearer tokens
//! stored server-side (see [`crate::db::tokens`]).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use partshed_core::{Email, UserId, UserRole};

use crate::db::{AuthTokenRepository, UserChanges, UserRepository};
use crate::error::{AppError, FieldError};
use crate::models::{LoginInput, RegisterInput, UpdateUserInput, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// A logged-in session: the bearer token plus the user it belongs to.
#[derive(Debug)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: AuthTokenRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: AuthTokenRepository::new(pool),
        }
    }

    /// Register a new account and issue its first token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` with per-field messages, or
    /// `AppError::Conflict` ("User already exists") when the email or
    /// username is taken.
    pub async fn register(&self, input: &RegisterInput) -> Result<AuthSession, AppError> {
        let mut errors = Vec::new();
        if input.username.trim().is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        }
        let email = match Email::parse(&input.email) {
            Ok(email) => Some(email),
            Err(_) => {
                errors.push(FieldError::new("email", "Please include a valid email"));
                None
            }
        };
        if let Err(e) = validate_password(&input.password) {
            errors.push(e);
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let email = email.ok_or_else(|| AppError::Internal("email validated above".to_owned()))?;

        if self
            .users
            .exists_with_email_or_username(&email, &input.username)
            .await?
        {
            return Err(AppError::Conflict("User already exists".to_owned()));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(&input.username, &email, &password_hash, UserRole::User)
            .await?;
        let token = self.tokens.create(user.id).await?;

        Ok(AuthSession { token, user })
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` ("Invalid credentials") when the email
    /// is unknown or the password does not match. Both cases share one
    /// message so callers cannot probe which emails exist.
    pub async fn login(&self, input: &LoginInput) -> Result<AuthSession, AppError> {
        let mut errors = Vec::new();
        let email = Email::parse(&input.email).ok();
        if email.is_none() {
            errors.push(FieldError::new("email", "Please include a valid email"));
        }
        if input.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let email = email.ok_or_else(|| AppError::Internal("email validated above".to_owned()))?;

        let Some(record) = self.users.get_auth_by_email(&email).await? else {
            return Err(AppError::BadRequest("Invalid credentials".to_owned()));
        };
        verify_password(&input.password, &record.password_hash)?;

        let token = self.tokens.create(record.user.id).await?;
        Ok(AuthSession {
            token,
            user: record.user,
        })
    }

    /// Look up the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the account no longer exists.
    pub async fn current_user(&self, id: UserId) -> Result<User, AppError> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
    }

    /// Apply a partial profile update. An empty bag returns the profile
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` on bad fields, `AppError::Conflict`
    /// ("Username already taken" / "Email already in use") on collisions, or
    /// `AppError::NotFound` when the account no longer exists.
    pub async fn update_profile(
        &self,
        id: UserId,
        input: &UpdateUserInput,
    ) -> Result<User, AppError> {
        let current = self.current_user(id).await?;
        if input.is_empty() {
            return Ok(current);
        }

        let mut errors = Vec::new();
        if let Some(username) = &input.username
            && username.trim().is_empty()
        {
            errors.push(FieldError::new("username", "Username is required"));
        }
        let email = match &input.email {
            Some(raw) => match Email::parse(raw) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push(FieldError::new("email", "Please include a valid email"));
                    None
                }
            },
            None => None,
        };
        if let Some(password) = &input.password
            && let Err(e) = validate_password(password)
        {
            errors.push(e);
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let password_hash = input.password.as_deref().map(hash_password).transpose()?;
        let changes = UserChanges {
            username: input.username.clone(),
            email,
            password_hash,
        };

        Ok(self.users.update(id, &changes).await?)
    }
}

fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(FieldError::new(
            "password",
            format!("Please enter a password with {MIN_PASSWORD_LENGTH} or more characters"),
        ));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::BadRequest("Invalid credentials".to_owned()))?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::BadRequest("Invalid credentials".to_owned()))
}
