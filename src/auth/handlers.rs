// src/auth/handlers.rs

use axum::{extract::State, Json};
use std::sync::Arc;

use super::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use super::{AuthError, CurrentUser};
use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthError::Locked(until) => {
                ApiError::forbidden(format!("Account locked until {until}"))
            }
            AuthError::UsernameTaken => ApiError::conflict("Username already exists"),
            AuthError::Other(e) => {
                tracing::error!("Auth failure: {:?}", e);
                ApiError::internal("Authentication failed")
            }
        }
    }
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = state.auth.login(req).await?;
    Ok(Json(response))
}

/// Admins create accounts inside their own company.
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(current): CurrentUser,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if !current.role().is_admin() {
        return Err(ApiError::forbidden("Only admins can create users"));
    }

    let response = state.auth.register(&current.company_id, req).await?;
    Ok(Json(response))
}

pub async fn me_handler(CurrentUser(current): CurrentUser) -> Json<User> {
    Json(current)
}
