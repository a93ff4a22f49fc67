// src/customers/handlers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::types::{Customer, CustomerPayload};
use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::auth::CurrentUser;
use crate::state::AppState;

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Customer>>> {
    let customers = state
        .customers
        .list(&user.company_id)
        .await
        .into_api_error("Failed to list customers")?;
    Ok(Json(customers))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CustomerPayload>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let name = req
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Customer name is required"))?;

    let customer = state
        .customers
        .create(&user.company_id, &name, req)
        .await
        .into_api_error("Failed to create customer")?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .customers
        .get(&user.company_id, &id)
        .await
        .into_api_error("Failed to fetch customer")?
        .ok_or_not_found("Customer not found")?;
    Ok(Json(customer))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CustomerPayload>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .customers
        .update(&user.company_id, &id, req)
        .await
        .into_api_error("Failed to update customer")?
        .ok_or_not_found("Customer not found")?;
    Ok(Json(customer))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let deleted = state
        .customers
        .delete(&user.company_id, &id)
        .await
        .into_api_error("Failed to delete customer")?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Customer not found"))
    }
}
