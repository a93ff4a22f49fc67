// src/scheduler/mod.rs
//! Urgency ranking for interventions.
//!
//! Scores every record from four independent signals (stated priority,
//! lifecycle status, age, schedule proximity), maps the summed score to a
//! discrete urgency label, and returns annotated copies sorted by descending
//! score. The sort is stable: records with equal scores keep the relative
//! order the caller supplied them in.
//!
//! The current time is always injected so results are reproducible under a
//! pinned clock. Malformed or missing date strings are not errors; they
//! simply contribute no bonus.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// Anything the scorer can rank. Implemented by the stored intervention row;
/// the scorer itself owns no storage.
pub trait Scoreable {
    fn priority(&self) -> Option<&str>;
    fn status(&self) -> Option<&str>;
    fn scheduled_date(&self) -> Option<&str>;
    fn created_at(&self) -> Option<&str>;
}

/// A free-standing record with just the scored fields. Useful for callers
/// that do not hold a full intervention row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterventionRecord {
    pub priority: Option<String>,
    pub status: Option<String>,
    pub scheduled_date: Option<String>,
    pub created_at: Option<String>,
}

impl Scoreable for InterventionRecord {
    fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
    fn scheduled_date(&self) -> Option<&str> {
        self.scheduled_date.as_deref()
    }
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

/// Discrete urgency level derived from the score. Ordered ascending so that
/// a higher score never maps to a lower-ranked label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Low,
    Normal,
    High,
    Critical,
}

impl Urgency {
    /// Threshold step function; the first matching threshold wins.
    pub fn from_score(score: i64) -> Self {
        if score >= 60 {
            Urgency::Critical
        } else if score >= 40 {
            Urgency::High
        } else if score >= 25 {
            Urgency::Normal
        } else {
            Urgency::Low
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Low => "LOW",
            Urgency::Normal => "NORMAL",
            Urgency::High => "HIGH",
            Urgency::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

/// An input record annotated with its score and label.
#[derive(Debug, Clone, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub item: T,
    pub score: i64,
    pub label: Urgency,
}

/// Rank records by urgency, most urgent first.
///
/// Pure transformation: inputs are cloned, never mutated, and output length
/// always equals input length.
pub fn rank<T>(items: &[T], now: DateTime<Utc>) -> Vec<Ranked<T>>
where
    T: Scoreable + Clone,
{
    let mut ranked: Vec<Ranked<T>> = items
        .iter()
        .map(|item| {
            let score = score_record(item, now);
            Ranked {
                item: item.clone(),
                score,
                label: Urgency::from_score(score),
            }
        })
        .collect();

    // Stable descending sort: ties keep input order.
    ranked.sort_by_key(|r| Reverse(r.score));
    ranked
}

/// Sum the four signal weights for one record.
pub fn score_record<T: Scoreable>(item: &T, now: DateTime<Utc>) -> i64 {
    priority_weight(item.priority())
        + status_weight(item.status())
        + age_bonus(item.created_at(), now)
        + schedule_bonus(item.scheduled_date(), now)
}

fn priority_weight(priority: Option<&str>) -> i64 {
    match priority.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
        Some("high") => 30,
        Some("medium") => 15,
        _ => 5,
    }
}

fn status_weight(status: Option<&str>) -> i64 {
    match status.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("open") | Some("in_progress") => 20,
        _ => -10,
    }
}

/// Older records climb the list: +1 per whole day since creation, capped at
/// 20. Future or unparseable timestamps contribute nothing.
fn age_bonus(created_at: Option<&str>, now: DateTime<Utc>) -> i64 {
    let Some(created) = created_at.and_then(parse_flexible) else {
        return 0;
    };
    let age_days = (now.naive_utc() - created).num_days();
    age_days.clamp(0, 20)
}

/// Due today or overdue → +20, due within two days → +10, otherwise nothing.
fn schedule_bonus(scheduled_date: Option<&str>, now: DateTime<Utc>) -> i64 {
    let Some(scheduled) = scheduled_date.and_then(parse_flexible) else {
        return 0;
    };
    let delta_days = (scheduled - now.naive_utc()).num_days();
    if delta_days <= 0 {
        20
    } else if delta_days <= 2 {
        10
    } else {
        0
    }
}

/// Fallible ISO-8601 parse covering the shapes historically stored by the
/// application: RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS[.f]` timestamp (with
/// either `T` or space separator), and a bare `YYYY-MM-DD` date.
pub fn parse_flexible(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}
