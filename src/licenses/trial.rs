// src/licenses/trial.rs

use chrono::{DateTime, Duration, Utc};

use crate::auth::User;
use crate::config::CONFIG;
use crate::scheduler::parse_flexible;

/// Admins and activated accounts never expire. A missing trial start counts
/// as expired rather than granting an indefinite trial.
pub fn is_trial_expired(user: &User, now: DateTime<Utc>) -> bool {
    if user.role().is_admin() || user.is_activated() {
        return false;
    }
    let Some(start) = user.trial_start.as_deref().and_then(parse_flexible) else {
        return true;
    };
    now.naive_utc() > start + Duration::days(CONFIG.trial_days)
}

/// Days left in the trial; `None` when the gate does not apply.
pub fn remaining_trial_days(user: &User, now: DateTime<Utc>) -> Option<i64> {
    if user.role().is_admin() || user.is_activated() {
        return None;
    }
    let start = user.trial_start.as_deref().and_then(parse_flexible)?;
    let remaining = (start + Duration::days(CONFIG.trial_days) - now.naive_utc()).num_days();
    Some(remaining.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(role: &str, is_activated: i64, trial_start: Option<&str>) -> User {
        User {
            id: "u".into(),
            company_id: "c".into(),
            username: "alice".into(),
            password_hash: "h".into(),
            role: role.into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            trial_start: trial_start.map(str::to_string),
            is_activated,
            license_key: None,
            failed_logins: 0,
            locked_until: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn admin_never_expires() {
        let u = user("admin", 0, Some("2020-01-01T00:00:00"));
        assert!(!is_trial_expired(&u, now()));
        assert_eq!(remaining_trial_days(&u, now()), None);
    }

    #[test]
    fn activated_account_never_expires() {
        let u = user("tech", 1, Some("2020-01-01T00:00:00"));
        assert!(!is_trial_expired(&u, now()));
    }

    #[test]
    fn fresh_trial_is_not_expired() {
        let u = user("tech", 0, Some("2024-06-10T00:00:00"));
        assert!(!is_trial_expired(&u, now()));
        assert_eq!(remaining_trial_days(&u, now()), Some(24));
    }

    #[test]
    fn old_trial_is_expired() {
        let u = user("client", 0, Some("2024-01-01T00:00:00"));
        assert!(is_trial_expired(&u, now()));
        assert_eq!(remaining_trial_days(&u, now()), Some(0));
    }

    #[test]
    fn missing_trial_start_counts_as_expired() {
        let u = user("tech", 0, None);
        assert!(is_trial_expired(&u, now()));
    }
}
