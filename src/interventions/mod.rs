// src/interventions/mod.rs

pub mod handlers;
pub mod store;
pub mod types;

pub use store::InterventionStore;
pub use types::{Intervention, NewIntervention, UpdateIntervention};
