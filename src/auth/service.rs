// src/auth/service.rs

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::jwt::create_token;
use super::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use super::password::{hash_password, verify_password};
use crate::config::CONFIG;
use crate::scheduler::parse_flexible;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account locked until {0}")]
    Locked(String),
    #[error("Username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AuthService {
    db: SqlitePool,
}

impl AuthService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Verify credentials and issue a token. Consecutive failures increment a
    /// per-account counter; at the configured threshold the account locks for
    /// a fixed window. A successful login clears both.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = self
            .get_user_by_username(&req.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if let Some(locked_until) = user.locked_until.as_deref().and_then(parse_flexible) {
            if locked_until > Utc::now().naive_utc() {
                return Err(AuthError::Locked(locked_until.format("%Y-%m-%dT%H:%M:%S").to_string()));
            }
        }

        if !verify_password(&req.password, &user.password_hash).map_err(AuthError::Other)? {
            self.record_failed_login(&user).await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.reset_failed_logins(&user.id).await?;
        let token = create_token(&user.id, &user.username).map_err(AuthError::Other)?;

        Ok(AuthResponse { token, user })
    }

    /// Create a user inside the given company. Caller is responsible for the
    /// admin-only authorization check.
    pub async fn register(
        &self,
        company_id: &str,
        req: RegisterRequest,
    ) -> Result<AuthResponse, AuthError> {
        if self.username_exists(&req.username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let user_id = Uuid::new_v4().to_string();
        let password_hash = hash_password(&req.password).map_err(AuthError::Other)?;
        let now = Utc::now().to_rfc3339();
        let role = req.role.to_string();

        sqlx::query(
            r#"
            INSERT INTO users
                (id, company_id, username, password_hash, role, created_at, trial_start, is_activated)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&user_id)
        .bind(company_id)
        .bind(&req.username)
        .bind(&password_hash)
        .bind(&role)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .context("insert user")?;

        let user = self.get_user_by_id(&user_id).await?;
        let token = create_token(&user.id, &user.username).map_err(AuthError::Other)?;

        Ok(AuthResponse { token, user })
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await
            .context("user not found")
    }

    /// `Ok(None)` means the username does not exist; database failures stay
    /// errors so callers never mistake an outage for bad credentials.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await
            .context("fetch user by username")
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.db)
            .await
            .context("count username")?;

        Ok(count.0 > 0)
    }

    async fn record_failed_login(&self, user: &User) -> Result<()> {
        let failed = user.failed_logins + 1;

        if failed >= CONFIG.lockout_threshold {
            let locked_until =
                (Utc::now() + Duration::minutes(CONFIG.lockout_minutes)).to_rfc3339();
            warn!(username = %user.username, "Account locked after repeated failed logins");
            sqlx::query("UPDATE users SET failed_logins = 0, locked_until = ? WHERE id = ?")
                .bind(&locked_until)
                .bind(&user.id)
                .execute(&self.db)
                .await
                .context("lock account")?;
        } else {
            sqlx::query("UPDATE users SET failed_logins = ? WHERE id = ?")
                .bind(failed)
                .bind(&user.id)
                .execute(&self.db)
                .await
                .context("record failed login")?;
        }

        Ok(())
    }

    async fn reset_failed_logins(&self, user_id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET failed_logins = 0, locked_until = NULL WHERE id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("reset failed logins")?;

        Ok(())
    }
}
