//! Bearer token authentication extractor.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::db::AuthTokenRepository;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires a valid, unexpired bearer token.
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("user {}", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthorized("No token, authorization denied".to_owned())
            })?;

        let user = AuthTokenRepository::new(state.pool())
            .authenticate(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Token is not valid".to_owned()))?;

        Ok(Self(user))
    }
}
