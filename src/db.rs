// src/db.rs
//! Database pool configuration, startup migrations, and first-run seeding.
//! Migrations are idempotent `CREATE TABLE IF NOT EXISTS` blocks run at boot.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Executor;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::config::CONFIG;

/// Create an optimized SQLite connection pool
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        // SQLite is single-writer, but can have multiple readers
        .max_connections(CONFIG.sqlite_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .max_lifetime(Duration::from_secs(1800))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database: {database_url}"))
}

const CREATE_COMPANIES: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT NOT NULL,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL,
    trial_start TEXT,
    is_activated INTEGER NOT NULL DEFAULT 0,
    license_key TEXT,
    failed_logins INTEGER NOT NULL DEFAULT 0,
    locked_until TEXT,
    FOREIGN KEY (company_id) REFERENCES companies(id)
);
"#;

const CREATE_CUSTOMERS: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT NOT NULL,
    name TEXT NOT NULL,
    contact_email TEXT,
    phone TEXT,
    address TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (company_id) REFERENCES companies(id)
);
"#;

const CREATE_INTERVENTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS interventions (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    client_name TEXT,
    technician_name TEXT,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    scheduled_date TEXT,
    created_at TEXT NOT NULL,
    created_by TEXT,
    FOREIGN KEY (company_id) REFERENCES companies(id),
    FOREIGN KEY (created_by) REFERENCES users(id)
);
"#;

const CREATE_ATTACHMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS attachments (
    id TEXT PRIMARY KEY NOT NULL,
    intervention_id TEXT NOT NULL,
    file_name TEXT NOT NULL,
    stored_path TEXT NOT NULL,
    content_type TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    uploaded_by TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (intervention_id) REFERENCES interventions(id) ON DELETE CASCADE
);
"#;

const CREATE_SIGNATURES: &str = r#"
CREATE TABLE IF NOT EXISTS signatures (
    intervention_id TEXT PRIMARY KEY NOT NULL,
    signer_name TEXT NOT NULL,
    image_base64 TEXT NOT NULL,
    signed_at TEXT NOT NULL,
    FOREIGN KEY (intervention_id) REFERENCES interventions(id) ON DELETE CASCADE
);
"#;

const CREATE_LICENSE_KEYS: &str = r#"
CREATE TABLE IF NOT EXISTS license_keys (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT NOT NULL,
    key TEXT UNIQUE NOT NULL,
    created_at TEXT NOT NULL,
    created_by TEXT,
    assigned_to TEXT,
    used INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (company_id) REFERENCES companies(id)
);
"#;

const CREATE_INDICES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_interventions_company ON interventions(company_id);
CREATE INDEX IF NOT EXISTS idx_interventions_technician ON interventions(technician_name);
CREATE INDEX IF NOT EXISTS idx_interventions_client ON interventions(client_name);
CREATE INDEX IF NOT EXISTS idx_customers_company ON customers(company_id);
CREATE INDEX IF NOT EXISTS idx_attachments_intervention ON attachments(intervention_id);
CREATE INDEX IF NOT EXISTS idx_license_keys_company ON license_keys(company_id);
"#;

/// Run all startup migrations. Safe to call on every boot.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    pool.execute(CREATE_COMPANIES).await.context("create companies")?;
    pool.execute(CREATE_USERS).await.context("create users")?;
    pool.execute(CREATE_CUSTOMERS).await.context("create customers")?;
    pool.execute(CREATE_INTERVENTIONS).await.context("create interventions")?;
    pool.execute(CREATE_ATTACHMENTS).await.context("create attachments")?;
    pool.execute(CREATE_SIGNATURES).await.context("create signatures")?;
    pool.execute(CREATE_LICENSE_KEYS).await.context("create license_keys")?;
    pool.execute(CREATE_INDICES).await.context("create indices")?;
    Ok(())
}

/// Seed the default company and admin account on first run.
/// The admin is created pre-activated so the trial gate never applies to it.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<()> {
    let (user_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("count users")?;
    if user_count > 0 {
        return Ok(());
    }

    let now = Utc::now().to_rfc3339();
    let company_id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO companies (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&company_id)
        .bind("Default Company")
        .bind(&now)
        .execute(pool)
        .await
        .context("seed default company")?;

    let admin_id = Uuid::new_v4().to_string();
    let password_hash = hash_password(&CONFIG.admin_password)?;

    sqlx::query(
        r#"
        INSERT INTO users
            (id, company_id, username, password_hash, role, created_at, trial_start, is_activated)
        VALUES (?, ?, ?, ?, 'admin', ?, ?, 1)
        "#,
    )
    .bind(&admin_id)
    .bind(&company_id)
    .bind("admin")
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .context("seed admin user")?;

    info!("Seeded default company and admin account");
    Ok(())
}
