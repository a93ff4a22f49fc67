// src/auth/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account roles, stored in the database as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Owner,
    Manager,
    Tech,
    Client,
}

impl Role {
    /// Roles that see every intervention in their company.
    pub fn sees_all_interventions(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner | Role::Manager)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            "manager" => Ok(Role::Manager),
            "tech" => Ok(Role::Tech),
            "client" => Ok(Role::Client),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Tech => "tech",
            Role::Client => "client",
        };
        write!(f, "{}", s)
    }
}

/// Full user row; the password hash never leaves the server.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub company_id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub trial_start: Option<String>,
    pub is_activated: i64,
    pub license_key: Option<String>,
    pub failed_logins: i64,
    pub locked_until: Option<String>,
}

impl User {
    /// Unknown role strings fall back to the least-privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Client)
    }

    pub fn is_activated(&self) -> bool {
        self.is_activated != 0
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::Admin, Role::Owner, Role::Manager, Role::Tech, Role::Client] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_string_defaults_to_client() {
        let user = User {
            id: "u".into(),
            company_id: "c".into(),
            username: "x".into(),
            password_hash: "h".into(),
            role: "superuser".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            trial_start: None,
            is_activated: 0,
            license_key: None,
            failed_logins: 0,
            locked_until: None,
        };
        assert_eq!(user.role(), Role::Client);
        assert!(!user.role().sees_all_interventions());
    }
}
