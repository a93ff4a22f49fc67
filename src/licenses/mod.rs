// src/licenses/mod.rs
//! License keys and the 30-day trial gate.

pub mod handlers;
pub mod store;
pub mod trial;

pub use store::{LicenseError, LicenseKey, LicenseStore};
pub use trial::{is_trial_expired, remaining_trial_days};

/// Generate a fresh license key: `MC-` plus 8 random bytes in upper-hex.
pub fn generate_key() -> String {
    let bytes: [u8; 8] = rand::random();
    format!("MC-{}", hex::encode_upper(bytes))
}
