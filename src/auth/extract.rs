// src/auth/extract.rs
//! Bearer-token extractor: resolves the Authorization header to a full user
//! row so handlers can check roles and tenancy without repeating the lookup.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::sync::Arc;

use super::jwt::verify_token;
use super::models::User;
use crate::api::error::ApiError;
use crate::state::AppState;

pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Malformed authorization header"))?;

        let claims = verify_token(token).map_err(|_| ApiError::unauthorized("Invalid token"))?;

        let user = state
            .auth
            .get_user_by_id(&claims.sub)
            .await
            .map_err(|_| ApiError::unauthorized("Unknown user"))?;

        Ok(CurrentUser(user))
    }
}
