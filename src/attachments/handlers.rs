// src/attachments/handlers.rs
//! Photo/file proof uploads and client signatures for an intervention.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use base64::Engine;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::store::{Attachment, Signature};
use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::auth::CurrentUser;
use crate::config::CONFIG;
use crate::state::AppState;

/// Strip any path components a client smuggles into the file name.
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("upload")
        .trim();
    if base.is_empty() {
        "upload".to_string()
    } else {
        base.to_string()
    }
}

async fn require_intervention(
    state: &AppState,
    company_id: &str,
    intervention_id: &str,
) -> Result<(), ApiError> {
    state
        .interventions
        .get(company_id, intervention_id)
        .await
        .into_api_error("Failed to fetch intervention")?
        .ok_or_not_found("Intervention not found")?;
    Ok(())
}

/// Write the file under the uploads directory and record its metadata row.
/// The row is the source of truth: if the insert fails, the stored file is
/// removed again so nothing orphaned is left on disk.
async fn store_upload(
    state: &AppState,
    intervention_id: &str,
    uploaded_by: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<Attachment, ApiError> {
    let stored_name = format!("{}_{}", Uuid::new_v4(), file_name);
    let stored_path = PathBuf::from(&CONFIG.uploads_dir).join(&stored_name);

    tokio::fs::write(&stored_path, bytes)
        .await
        .into_api_error("Failed to store upload")?;

    match state
        .attachments
        .create(
            intervention_id,
            file_name,
            &stored_path.to_string_lossy(),
            content_type,
            bytes.len() as i64,
            uploaded_by,
        )
        .await
    {
        Ok(attachment) => Ok(attachment),
        Err(e) => {
            let _ = tokio::fs::remove_file(&stored_path).await;
            tracing::error!("Failed to record attachment: {:?}", e);
            Err(ApiError::internal("Failed to record attachment"))
        }
    }
}

pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(intervention_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Vec<Attachment>>)> {
    require_intervention(&state, &user.company_id, &intervention_id).await?;

    tokio::fs::create_dir_all(&CONFIG.uploads_dir)
        .await
        .into_api_error("Failed to prepare uploads directory")?;

    let mut saved = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(sanitize_file_name) else {
            // Skip non-file form fields
            continue;
        };
        let declared_type = field.content_type().map(str::to_string);

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;

        if bytes.len() > CONFIG.max_upload_bytes {
            return Err(ApiError::bad_request("Upload exceeds the size limit"));
        }

        let content_type = declared_type.unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string()
        });

        let attachment =
            store_upload(&state, &intervention_id, &user.id, &file_name, &content_type, &bytes)
                .await?;
        saved.push(attachment);
    }

    if saved.is_empty() {
        return Err(ApiError::bad_request("No file field in upload"));
    }

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(intervention_id): Path<String>,
) -> ApiResult<Json<Vec<Attachment>>> {
    require_intervention(&state, &user.company_id, &intervention_id).await?;

    let attachments = state
        .attachments
        .list_for_intervention(&intervention_id)
        .await
        .into_api_error("Failed to list attachments")?;
    Ok(Json(attachments))
}

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    pub signer_name: String,
    pub image_base64: String,
}

pub async fn sign_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(intervention_id): Path<String>,
    Json(req): Json<SignatureRequest>,
) -> ApiResult<(StatusCode, Json<Signature>)> {
    require_intervention(&state, &user.company_id, &intervention_id).await?;

    if req.signer_name.trim().is_empty() {
        return Err(ApiError::bad_request("Signer name is required"));
    }
    if base64::engine::general_purpose::STANDARD
        .decode(req.image_base64.as_bytes())
        .is_err()
    {
        return Err(ApiError::bad_request("Signature image must be base64"));
    }

    let signature = state
        .attachments
        .upsert_signature(&intervention_id, &req.signer_name, &req.image_base64)
        .await
        .into_api_error("Failed to store signature")?;
    Ok((StatusCode::CREATED, Json(signature)))
}

pub async fn get_signature_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(intervention_id): Path<String>,
) -> ApiResult<Json<Signature>> {
    require_intervention(&state, &user.company_id, &intervention_id).await?;

    let signature = state
        .attachments
        .get_signature(&intervention_id)
        .await
        .into_api_error("Failed to fetch signature")?
        .ok_or_not_found("No signature recorded")?;
    Ok(Json(signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn strips_directory_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\temp\\shot.png"), "shot.png");
        assert_eq!(sanitize_file_name("photo.jpg"), "photo.jpg");
    }

    #[test]
    fn empty_names_get_a_placeholder() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("dir/"), "upload");
    }

    #[tokio::test]
    async fn failed_metadata_insert_removes_the_stored_file() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        let state = crate::state::AppState::new(pool);
        // A closed pool makes the metadata insert fail after the file write
        state.pool.close().await;

        tokio::fs::create_dir_all(&CONFIG.uploads_dir).await.unwrap();
        let file_name = format!("{}.bin", Uuid::new_v4());

        let err = store_upload(&state, "i1", "u1", &file_name, "application/octet-stream", b"data")
            .await
            .unwrap_err();
        assert_eq!(err.status_code, StatusCode::INTERNAL_SERVER_ERROR);

        let mut dir = tokio::fs::read_dir(&CONFIG.uploads_dir).await.unwrap();
        while let Some(entry) = dir.next_entry().await.unwrap() {
            assert!(
                !entry.file_name().to_string_lossy().contains(&file_name),
                "orphaned upload left on disk"
            );
        }
    }
}
