//! Static Asset Server
//!
//! Serves client files from a directory on a separate port, with a
//! permissive CORS policy on every response and a `/health` probe.
//! Incidental to the relay core; it shares nothing with the registry.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::network::server::RelayServerError;

/// Build the static-file router with open CORS.
pub fn router(static_dir: PathBuf) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serve static assets until the process exits.
pub async fn serve(addr: SocketAddr, static_dir: PathBuf) -> Result<(), RelayServerError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting HTTP server on {}...", addr);
    axum::serve(listener, router(static_dir)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_payload() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_router_builds() {
        let _ = router(PathBuf::from("."));
    }
}
