// src/customers/mod.rs

pub mod handlers;
pub mod store;
pub mod types;

pub use store::CustomerStore;
pub use types::{Customer, CustomerPayload};
