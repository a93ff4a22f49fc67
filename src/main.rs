// src/main.rs

use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use maintcontrol::api::router::api_router;
use maintcontrol::config::CONFIG;
use maintcontrol::{db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let level = Level::from_str(&CONFIG.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting MaintControl backend");

    let pool = db::create_pool(&CONFIG.database_url).await?;
    db::run_migrations(&pool).await?;
    db::seed_if_empty(&pool).await?;

    tokio::fs::create_dir_all(&CONFIG.uploads_dir).await?;

    let app_state = Arc::new(AppState::new(pool));
    let app = api_router(app_state);

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
