use std::net::SocketAddr;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Liveness routes; `/health` preferred, `/healthz` for kubelet probes.
pub fn health_router() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_health_server(addr: SocketAddr) -> anyhow::Result<()> {
    info!("health endpoint listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, health_router())
        .await?;
    Ok(())
}
