// src/interventions/store.rs

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::types::{priority, status, Intervention, NewIntervention, UpdateIntervention};
use crate::auth::{Role, User};

#[derive(Clone)]
pub struct InterventionStore {
    pool: SqlitePool,
}

impl InterventionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_id: &str,
        created_by: &str,
        req: NewIntervention,
    ) -> Result<Intervention> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let status = req.status.unwrap_or_else(|| status::OPEN.to_string());
        let priority = req.priority.unwrap_or_else(|| priority::MEDIUM.to_string());

        sqlx::query(
            r#"
            INSERT INTO interventions
                (id, company_id, title, description, client_name, technician_name,
                 status, priority, scheduled_date, created_at, created_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(company_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.client_name)
        .bind(&req.technician_name)
        .bind(&status)
        .bind(&priority)
        .bind(&req.scheduled_date)
        .bind(&now)
        .bind(created_by)
        .execute(&self.pool)
        .await
        .context("insert intervention")?;

        self.get(company_id, &id)
            .await?
            .context("intervention vanished after insert")
    }

    pub async fn get(&self, company_id: &str, id: &str) -> Result<Option<Intervention>> {
        sqlx::query_as::<_, Intervention>(
            "SELECT * FROM interventions WHERE id = ? AND company_id = ?",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .context("fetch intervention")
    }

    /// Role-scoped listing: admin/owner/manager see the whole company, techs
    /// see their assignments, clients see their own interventions.
    pub async fn list_scoped(&self, user: &User) -> Result<Vec<Intervention>> {
        let role = user.role();
        let rows = if role.sees_all_interventions() {
            sqlx::query_as::<_, Intervention>(
                "SELECT * FROM interventions WHERE company_id = ? ORDER BY created_at DESC",
            )
            .bind(&user.company_id)
            .fetch_all(&self.pool)
            .await
        } else if role == Role::Tech {
            sqlx::query_as::<_, Intervention>(
                r#"
                SELECT * FROM interventions
                WHERE company_id = ? AND technician_name = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(&user.company_id)
            .bind(&user.username)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, Intervention>(
                r#"
                SELECT * FROM interventions
                WHERE company_id = ? AND client_name = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(&user.company_id)
            .bind(&user.username)
            .fetch_all(&self.pool)
            .await
        };

        rows.context("list interventions")
    }

    /// Apply a partial update; absent fields keep their stored values.
    pub async fn update(
        &self,
        company_id: &str,
        id: &str,
        req: UpdateIntervention,
    ) -> Result<Option<Intervention>> {
        let Some(existing) = self.get(company_id, id).await? else {
            return Ok(None);
        };

        let title = req.title.unwrap_or(existing.title);
        let description = req.description.or(existing.description);
        let client_name = req.client_name.or(existing.client_name);
        let technician_name = req.technician_name.or(existing.technician_name);
        let status = req.status.unwrap_or(existing.status);
        let priority = req.priority.unwrap_or(existing.priority);
        let scheduled_date = req.scheduled_date.or(existing.scheduled_date);

        sqlx::query(
            r#"
            UPDATE interventions
            SET title = ?, description = ?, client_name = ?, technician_name = ?,
                status = ?, priority = ?, scheduled_date = ?
            WHERE id = ? AND company_id = ?
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(&client_name)
        .bind(&technician_name)
        .bind(&status)
        .bind(&priority)
        .bind(&scheduled_date)
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .context("update intervention")?;

        self.get(company_id, id).await
    }

    pub async fn delete(&self, company_id: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM interventions WHERE id = ? AND company_id = ?")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await
            .context("delete intervention")?;

        Ok(result.rows_affected() > 0)
    }
}
