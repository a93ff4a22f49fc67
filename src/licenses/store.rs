// src/licenses/store.rs

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use super::generate_key;

#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("Invalid or already used key")]
    InvalidKey,
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LicenseKey {
    pub id: String,
    pub company_id: String,
    pub key: String,
    pub created_at: String,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub used: i64,
}

#[derive(Clone)]
pub struct LicenseStore {
    pool: SqlitePool,
}

impl LicenseStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn generate(&self, company_id: &str, created_by: &str) -> Result<LicenseKey> {
        let id = Uuid::new_v4().to_string();
        let key = generate_key();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO license_keys (id, company_id, key, created_at, created_by)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(company_id)
        .bind(&key)
        .bind(&now)
        .bind(created_by)
        .execute(&self.pool)
        .await
        .context("insert license key")?;

        self.get_by_key(company_id, &key)
            .await?
            .context("license key vanished after insert")
    }

    pub async fn list(&self, company_id: &str) -> Result<Vec<LicenseKey>> {
        sqlx::query_as::<_, LicenseKey>(
            "SELECT * FROM license_keys WHERE company_id = ? ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .context("list license keys")
    }

    async fn get_by_key(&self, company_id: &str, key: &str) -> Result<Option<LicenseKey>> {
        sqlx::query_as::<_, LicenseKey>(
            "SELECT * FROM license_keys WHERE key = ? AND company_id = ?",
        )
        .bind(key)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .context("fetch license key")
    }

    /// Redeem an unused key for the given user: marks the key used and the
    /// account activated, in one transaction.
    pub async fn redeem(
        &self,
        company_id: &str,
        key: &str,
        user_id: &str,
    ) -> Result<(), LicenseError> {
        let license = self
            .get_by_key(company_id, key)
            .await?
            .filter(|k| k.used == 0)
            .ok_or(LicenseError::InvalidKey)?;

        let mut tx = self.pool.begin().await.context("begin redeem")?;

        let updated = sqlx::query(
            "UPDATE users SET is_activated = 1, license_key = ? WHERE id = ? AND company_id = ?",
        )
        .bind(&license.key)
        .bind(user_id)
        .bind(company_id)
        .execute(&mut *tx)
        .await
        .context("activate user")?;

        if updated.rows_affected() == 0 {
            return Err(LicenseError::UserNotFound);
        }

        sqlx::query("UPDATE license_keys SET assigned_to = ?, used = 1 WHERE id = ?")
            .bind(user_id)
            .bind(&license.id)
            .execute(&mut *tx)
            .await
            .context("mark key used")?;

        tx.commit().await.context("commit redeem")?;
        Ok(())
    }

    /// Admin flow: look the user up by username, then redeem on their behalf.
    pub async fn assign(
        &self,
        company_id: &str,
        key: &str,
        username: &str,
    ) -> Result<(), LicenseError> {
        let user: Option<(String,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ? AND company_id = ?")
                .bind(username)
                .bind(company_id)
                .fetch_optional(&self.pool)
                .await
                .context("lookup user for assignment")?;

        let (user_id,) = user.ok_or(LicenseError::UserNotFound)?;
        self.redeem(company_id, key, &user_id).await
    }
}
