//! Health check endpoint
//!
//! Liveness probe for load balancers and container orchestrators. It never calls
//! the upstream API.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::config::StoreBackend;
use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    pub version: &'static str,
    /// Whether an upstream API key is configured
    pub upstream_key_configured: bool,
    /// Whether callers can authenticate
    pub auth_enabled: bool,
    /// Template store backend in use: "memory" or "file"
    pub store_backend: &'static str,
}

/// Health check handler
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_backend = match state.config().store.backend {
        StoreBackend::Memory => "memory",
        StoreBackend::File => "file",
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            version: env!("CARGO_PKG_VERSION"),
            upstream_key_configured: state.config().openai.api_key().is_some(),
            auth_enabled: state.authenticator().is_some(),
            store_backend,
        }),
    )
}
