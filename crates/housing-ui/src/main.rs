mod assets;
mod handlers;
mod html;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use housing_config::ServiceConfig;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::UiState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;

    // Artifacts load on first page render, not here.
    let state = Arc::new(UiState::new(config.artifacts.clone(), config.max_upload_bytes));
    let app = build_router(state);

    info!("Starting UI on http://{}", config.ui_addr);
    let listener = tokio::net::TcpListener::bind(config.ui_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: Arc<UiState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    let batch_routes = Router::new()
        .route("/batch/preview", post(handlers::batch::preview))
        .route("/batch/predict", post(handlers::batch::predict))
        .route("/batch/download", post(handlers::batch::download))
        .layer(upload_limit);

    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::single::predict))
        .route("/assets/{*path}", get(assets::serve))
        .merge(batch_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
