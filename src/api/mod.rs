//! Liveness endpoint.
//!
//! A minimal always-200 responder kept to satisfy external uptime
//! probes; it is independent of the capture and sync pipeline.


use std::net::IpAddr;

use axum::routing::get;
use axum::{Json, Router};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Errors from the liveness server.
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind liveness listener: {0}")]
    #[diagnostic(code(memosync::api::bind))]
    Bind(#[source] std::io::Error),

    #[error("Liveness server error: {0}")]
    #[diagnostic(code(memosync::api::serve))]
    Serve(#[source] std::io::Error),
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Create the liveness router
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

/// Run the liveness server on the given address
pub async fn serve(host: IpAddr, port: u16) -> Result<(), ApiError> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(ApiError::Bind)?;
    info!("liveness endpoint listening on http://{}", addr);

    axum::serve(listener, create_router())
        .await
        .map_err(ApiError::Serve)?;
    Ok(())
}
