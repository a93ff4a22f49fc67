// src/customers/store.rs

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::types::{Customer, CustomerPayload};

#[derive(Clone)]
pub struct CustomerStore {
    pool: SqlitePool,
}

impl CustomerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, company_id: &str, name: &str, req: CustomerPayload) -> Result<Customer> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO customers (id, company_id, name, contact_email, phone, address, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(company_id)
        .bind(name)
        .bind(&req.contact_email)
        .bind(&req.phone)
        .bind(&req.address)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("insert customer")?;

        self.get(company_id, &id)
            .await?
            .context("customer vanished after insert")
    }

    pub async fn get(&self, company_id: &str, id: &str) -> Result<Option<Customer>> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ? AND company_id = ?")
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await
            .context("fetch customer")
    }

    pub async fn list(&self, company_id: &str) -> Result<Vec<Customer>> {
        sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE company_id = ? ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .context("list customers")
    }

    pub async fn update(
        &self,
        company_id: &str,
        id: &str,
        req: CustomerPayload,
    ) -> Result<Option<Customer>> {
        let Some(existing) = self.get(company_id, id).await? else {
            return Ok(None);
        };

        let name = req.name.unwrap_or(existing.name);
        let contact_email = req.contact_email.or(existing.contact_email);
        let phone = req.phone.or(existing.phone);
        let address = req.address.or(existing.address);

        sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, contact_email = ?, phone = ?, address = ?
            WHERE id = ? AND company_id = ?
            "#,
        )
        .bind(&name)
        .bind(&contact_email)
        .bind(&phone)
        .bind(&address)
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .context("update customer")?;

        self.get(company_id, id).await
    }

    pub async fn delete(&self, company_id: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ? AND company_id = ?")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await
            .context("delete customer")?;

        Ok(result.rows_affected() > 0)
    }
}
