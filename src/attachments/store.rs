// src/attachments/store.rs

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Attachment {
    pub id: String,
    pub intervention_id: String,
    pub file_name: String,
    pub stored_path: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Signature {
    pub intervention_id: String,
    pub signer_name: String,
    pub image_base64: String,
    pub signed_at: String,
}

#[derive(Clone)]
pub struct AttachmentStore {
    pool: SqlitePool,
}

impl AttachmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        intervention_id: &str,
        file_name: &str,
        stored_path: &str,
        content_type: &str,
        size_bytes: i64,
        uploaded_by: &str,
    ) -> Result<Attachment> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO attachments
                (id, intervention_id, file_name, stored_path, content_type, size_bytes,
                 uploaded_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(intervention_id)
        .bind(file_name)
        .bind(stored_path)
        .bind(content_type)
        .bind(size_bytes)
        .bind(uploaded_by)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("insert attachment")?;

        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await
            .context("fetch attachment after insert")
    }

    pub async fn list_for_intervention(&self, intervention_id: &str) -> Result<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE intervention_id = ? ORDER BY created_at",
        )
        .bind(intervention_id)
        .fetch_all(&self.pool)
        .await
        .context("list attachments")
    }

    /// One signature per intervention; re-signing replaces the previous one.
    pub async fn upsert_signature(
        &self,
        intervention_id: &str,
        signer_name: &str,
        image_base64: &str,
    ) -> Result<Signature> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO signatures (intervention_id, signer_name, image_base64, signed_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(intervention_id)
            DO UPDATE SET signer_name = excluded.signer_name,
                          image_base64 = excluded.image_base64,
                          signed_at = excluded.signed_at
            "#,
        )
        .bind(intervention_id)
        .bind(signer_name)
        .bind(image_base64)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("upsert signature")?;

        self.get_signature(intervention_id)
            .await?
            .context("signature vanished after upsert")
    }

    pub async fn get_signature(&self, intervention_id: &str) -> Result<Option<Signature>> {
        sqlx::query_as::<_, Signature>("SELECT * FROM signatures WHERE intervention_id = ?")
            .bind(intervention_id)
            .fetch_optional(&self.pool)
            .await
            .context("fetch signature")
    }
}
