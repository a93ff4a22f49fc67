// src/licenses/handlers.rs

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::store::{LicenseError, LicenseKey};
use super::{is_trial_expired, remaining_trial_days};
use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::auth::CurrentUser;
use crate::state::AppState;

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        match err {
            LicenseError::InvalidKey => ApiError::bad_request("Invalid or already used key"),
            LicenseError::UserNotFound => ApiError::not_found("User not found"),
            LicenseError::Other(e) => {
                tracing::error!("License failure: {:?}", e);
                ApiError::internal("License operation failed")
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub key: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct TrialStatus {
    pub is_activated: bool,
    pub trial_expired: bool,
    pub trial_days_left: Option<i64>,
}

fn require_admin(user: &crate::auth::User) -> Result<(), ApiError> {
    if user.role().is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin only"))
    }
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<(StatusCode, Json<LicenseKey>)> {
    require_admin(&user)?;

    let key = state
        .licenses
        .generate(&user.company_id, &user.id)
        .await
        .into_api_error("Failed to generate license key")?;
    Ok((StatusCode::CREATED, Json(key)))
}

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<LicenseKey>>> {
    require_admin(&user)?;

    let keys = state
        .licenses
        .list(&user.company_id)
        .await
        .into_api_error("Failed to list license keys")?;
    Ok(Json(keys))
}

pub async fn assign_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<AssignRequest>,
) -> ApiResult<StatusCode> {
    require_admin(&user)?;

    state
        .licenses
        .assign(&user.company_id, &req.key, &req.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A user redeems a key for their own account.
pub async fn activate_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ActivateRequest>,
) -> ApiResult<StatusCode> {
    if user.is_activated() {
        return Err(ApiError::conflict("Account already activated"));
    }

    state
        .licenses
        .redeem(&user.company_id, &req.key, &user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn trial_status_handler(CurrentUser(user): CurrentUser) -> Json<TrialStatus> {
    let now = Utc::now();
    Json(TrialStatus {
        is_activated: user.is_activated(),
        trial_expired: is_trial_expired(&user, now),
        trial_days_left: remaining_trial_days(&user, now),
    })
}
