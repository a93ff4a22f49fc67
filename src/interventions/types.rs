// src/interventions/types.rs

use serde::{Deserialize, Serialize};

use crate::scheduler::Scoreable;

/// Canonical status values. Stored as free-form TEXT; the scorer tolerates
/// anything, but the API defaults new records to these.
pub mod status {
    pub const OPEN: &str = "open";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const DONE: &str = "done";
    pub const CANCELLED: &str = "cancelled";
}

pub mod priority {
    pub const HIGH: &str = "high";
    pub const MEDIUM: &str = "medium";
    pub const LOW: &str = "low";
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Intervention {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub technician_name: Option<String>,
    pub status: String,
    pub priority: String,
    pub scheduled_date: Option<String>,
    pub created_at: String,
    pub created_by: Option<String>,
}

impl Scoreable for Intervention {
    fn priority(&self) -> Option<&str> {
        Some(&self.priority)
    }
    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
    fn scheduled_date(&self) -> Option<&str> {
        self.scheduled_date.as_deref()
    }
    fn created_at(&self) -> Option<&str> {
        Some(&self.created_at)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewIntervention {
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub technician_name: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub scheduled_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateIntervention {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub technician_name: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub scheduled_date: Option<String>,
}
