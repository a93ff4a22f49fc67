// src/api/router.rs
// HTTP router composition for the REST API

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::attachments::handlers::{
    get_signature_handler, list_handler as attachment_list_handler, sign_handler, upload_handler,
};
use crate::auth::handlers::{login_handler, me_handler, register_handler};
use crate::billing::summary_handler;
use crate::config::CONFIG;
use crate::customers::handlers as customers;
use crate::export::{export_csv_handler, export_pdf_handler};
use crate::interventions::handlers as interventions;
use crate::licenses::handlers as licenses;
use crate::state::AppState;

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn api_router(app_state: Arc<AppState>) -> Router {
    let cors_origin = CONFIG
        .cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("*"));
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_handler))
        // Auth
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/me", get(me_handler))
        // Interventions
        .route(
            "/api/interventions",
            get(interventions::list_handler).post(interventions::create_handler),
        )
        .route(
            "/api/interventions/suggestions",
            get(interventions::suggestions_handler),
        )
        .route("/api/interventions/export/csv", get(export_csv_handler))
        .route("/api/interventions/export/pdf", get(export_pdf_handler))
        .route(
            "/api/interventions/{id}",
            get(interventions::get_handler)
                .put(interventions::update_handler)
                .delete(interventions::delete_handler),
        )
        .route(
            "/api/interventions/{id}/attachments",
            get(attachment_list_handler).post(upload_handler),
        )
        .route(
            "/api/interventions/{id}/signature",
            get(get_signature_handler).post(sign_handler),
        )
        // Customers
        .route(
            "/api/customers",
            get(customers::list_handler).post(customers::create_handler),
        )
        .route(
            "/api/customers/{id}",
            get(customers::get_handler)
                .put(customers::update_handler)
                .delete(customers::delete_handler),
        )
        // Billing
        .route("/api/billing/summary", get(summary_handler))
        // Licensing & trial
        .route("/api/licenses", get(licenses::list_handler))
        .route("/api/licenses/generate", post(licenses::generate_handler))
        .route("/api/licenses/assign", post(licenses::assign_handler))
        .route(
            "/api/activate",
            get(licenses::trial_status_handler).post(licenses::activate_handler),
        )
        .layer(DefaultBodyLimit::max(CONFIG.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
