// src/lib.rs

pub mod api;
pub mod attachments;
pub mod auth;
pub mod billing;
pub mod config;
pub mod customers;
pub mod db;
pub mod export;
pub mod interventions;
pub mod licenses;
pub mod scheduler;
pub mod state;
