use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod routes;

use routes::AppState;

fn app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/health", get(routes::health))
        .route("/telemetry/series", post(routes::telemetry_series))
        .route("/predictions/ranking", post(routes::prediction_ranking))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::ServerConfig::from_env()?;
    tracing::info!(
        "chart layout {}x{} margins={:?}",
        cfg.chart.width,
        cfg.chart.height,
        cfg.chart.margin
    );

    let state = AppState {
        chart: Arc::new(cfg.chart),
    };

    tracing::info!("listening on {}", cfg.bind);
    let listener = tokio::net::TcpListener::bind(cfg.bind).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
