mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use housing_config::ServiceConfig;
use housing_model::ArtifactStore;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::state::AppState;

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
    let (listener, app) = bind(&config).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads the artifacts, then binds the listener. No artifacts, no listener.
async fn bind(config: &ServiceConfig) -> Result<(TcpListener, Router)> {
    let facade = ArtifactStore::load(&config.artifacts).map_err(|e| {
        error!("Failed to load artifacts: {}", e);
        anyhow::anyhow!("{e}. Please train the model first.")
    })?;
    info!("Model and pipeline loaded successfully");

    let state = Arc::new(AppState::new(Some(facade), config));
    let app = build_router(state);

    info!("Starting server on {}", config.api_addr);
    let listener = TcpListener::bind(config.api_addr).await?;
    Ok((listener, app))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                id = %uuid::Uuid::new_v4(),
                method = %req.method(),
                uri = %req.uri(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict::predict))
        .route(
            "/predict-batch",
            post(handlers::predict::predict_batch).layer(upload_limit),
        )
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
