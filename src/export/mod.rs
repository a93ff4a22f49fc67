// src/export/mod.rs
//! CSV and PDF intervention reports. Both are gated on an activated account
//! or a running trial.

pub mod csv;
pub mod pdf;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::auth::{CurrentUser, User};
use crate::licenses::is_trial_expired;
use crate::state::AppState;

fn check_export_allowed(user: &User) -> Result<(), ApiError> {
    if is_trial_expired(user, Utc::now()) {
        return Err(ApiError::forbidden(
            "Trial expired - exports require an activated account",
        ));
    }
    Ok(())
}

pub async fn export_csv_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Response> {
    check_export_allowed(&user)?;

    let interventions = state
        .interventions
        .list_scoped(&user)
        .await
        .into_api_error("Failed to list interventions")?;

    let body = csv::interventions_csv(&interventions).into_api_error("Failed to produce CSV")?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"interventions.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn export_pdf_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Response> {
    check_export_allowed(&user)?;

    let interventions = state
        .interventions
        .list_scoped(&user)
        .await
        .into_api_error("Failed to list interventions")?;

    let body = pdf::interventions_pdf(&interventions).into_api_error("Failed to produce PDF")?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"interventions.pdf\"",
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Duration;

    fn user(role: &str, is_activated: i64, trial_start: Option<&str>) -> User {
        User {
            id: "u".into(),
            company_id: "c".into(),
            username: "alice".into(),
            password_hash: "h".into(),
            role: role.into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            trial_start: trial_start.map(str::to_string),
            is_activated,
            license_key: None,
            failed_logins: 0,
            locked_until: None,
        }
    }

    #[test]
    fn expired_trial_is_denied_exports() {
        let u = user("tech", 0, Some("2020-01-01T00:00:00"));
        let err = check_export_allowed(&u).unwrap_err();
        assert_eq!(err.status_code, StatusCode::FORBIDDEN);
    }

    #[test]
    fn running_trial_may_export() {
        let start = (Utc::now() - Duration::days(3)).to_rfc3339();
        let u = user("client", 0, Some(&start));
        assert!(check_export_allowed(&u).is_ok());
    }

    #[test]
    fn activated_account_may_export_after_trial_end() {
        let u = user("tech", 1, Some("2020-01-01T00:00:00"));
        assert!(check_export_allowed(&u).is_ok());
    }
}
