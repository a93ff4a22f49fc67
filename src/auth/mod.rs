// src/auth/mod.rs

pub mod extract;
pub mod handlers;
pub mod jwt;
pub mod models;
pub mod password;
pub mod service;

pub use extract::CurrentUser;
pub use models::{Role, User};
pub use service::{AuthError, AuthService};
