//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{LoginInput, RegisterInput, UpdateUserInput, User};
use crate::services::AuthService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/user", get(current_user).put(update_user))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<Value>, AppError> {
    let session = AuthService::new(state.pool()).register(&input).await?;
    Ok(Json(json!({ "token": session.token, "user": session.user })))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, AppError> {
    let session = AuthService::new(state.pool()).login(&input).await?;
    Ok(Json(json!({ "token": session.token, "user": session.user })))
}

/// GET /api/auth/user
async fn current_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>, AppError> {
    let user = AuthService::new(state.pool()).current_user(user.id).await?;
    Ok(Json(user))
}

/// PUT /api/auth/user
async fn update_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<User>, AppError> {
    let user = AuthService::new(state.pool())
        .update_profile(user.id, &input)
        .await?;
    Ok(Json(user))
}
