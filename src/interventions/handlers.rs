// src/interventions/handlers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use super::types::{Intervention, NewIntervention, UpdateIntervention};
use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::auth::CurrentUser;
use crate::scheduler::{self, Ranked};
use crate::state::AppState;

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Intervention>>> {
    let interventions = state
        .interventions
        .list_scoped(&user)
        .await
        .into_api_error("Failed to list interventions")?;
    Ok(Json(interventions))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<NewIntervention>,
) -> ApiResult<(StatusCode, Json<Intervention>)> {
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }

    let intervention = state
        .interventions
        .create(&user.company_id, &user.id, req)
        .await
        .into_api_error("Failed to create intervention")?;
    Ok((StatusCode::CREATED, Json(intervention)))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Intervention>> {
    let intervention = state
        .interventions
        .get(&user.company_id, &id)
        .await
        .into_api_error("Failed to fetch intervention")?
        .ok_or_not_found("Intervention not found")?;
    Ok(Json(intervention))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateIntervention>,
) -> ApiResult<Json<Intervention>> {
    let intervention = state
        .interventions
        .update(&user.company_id, &id, req)
        .await
        .into_api_error("Failed to update intervention")?
        .ok_or_not_found("Intervention not found")?;
    Ok(Json(intervention))
}

/// Only admins, owners, or the creator may delete.
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let intervention = state
        .interventions
        .get(&user.company_id, &id)
        .await
        .into_api_error("Failed to fetch intervention")?
        .ok_or_not_found("Intervention not found")?;

    let role = user.role();
    let is_creator = intervention.created_by.as_deref() == Some(user.id.as_str());
    if !(role.is_admin() || role == crate::auth::Role::Owner || is_creator) {
        return Err(ApiError::forbidden("Not allowed to delete this intervention"));
    }

    state
        .interventions
        .delete(&user.company_id, &id)
        .await
        .into_api_error("Failed to delete intervention")?;
    Ok(StatusCode::NO_CONTENT)
}

/// Urgency suggestions for the caller's role-scoped interventions, most
/// urgent first. The dashboard renders the label and may use the score for
/// styling only.
pub async fn suggestions_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Ranked<Intervention>>>> {
    let interventions = state
        .interventions
        .list_scoped(&user)
        .await
        .into_api_error("Failed to list interventions")?;

    Ok(Json(scheduler::rank(&interventions, Utc::now())))
}
