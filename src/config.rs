// src/config.rs
// All tunables load from the environment (and .env when present).

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct MaintConfig {
    // ── Server
    pub host: String,
    pub port: u16,
    pub cors_origin: String,

    // ── Database
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Auth
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub admin_password: String,
    pub lockout_threshold: i64,
    pub lockout_minutes: i64,

    // ── Licensing
    pub trial_days: i64,

    // ── Attachments
    pub uploads_dir: String,
    pub max_upload_bytes: usize,

    // ── Logging
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            // Tolerate trailing comments and whitespace in .env values
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl MaintConfig {
    pub fn from_env() -> Self {
        // Load from .env file first if it exists
        let _ = dotenvy::dotenv();

        Self {
            host: env_var_or("MAINT_HOST", "0.0.0.0".to_string()),
            port: env_var_or("MAINT_PORT", 3400),
            cors_origin: env_var_or("MAINT_CORS_ORIGIN", "http://localhost:3000".to_string()),
            database_url: env_var_or("DATABASE_URL", "sqlite:./maintcontrol.db?mode=rwc".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 10),
            jwt_secret: env_var_or(
                "MAINT_JWT_SECRET",
                "maintcontrol-jwt-secret-change-in-production".to_string(),
            ),
            jwt_ttl_days: env_var_or("MAINT_JWT_TTL_DAYS", 30),
            admin_password: env_var_or("MAINT_ADMIN_PASSWORD", "admin".to_string()),
            lockout_threshold: env_var_or("MAINT_LOCKOUT_THRESHOLD", 5),
            lockout_minutes: env_var_or("MAINT_LOCKOUT_MINUTES", 15),
            trial_days: env_var_or("MAINT_TRIAL_DAYS", 30),
            uploads_dir: env_var_or("MAINT_UPLOADS_DIR", "./uploads".to_string()),
            max_upload_bytes: env_var_or("MAINT_MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            log_level: env_var_or("MAINT_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub static CONFIG: Lazy<MaintConfig> = Lazy::new(MaintConfig::from_env);
