//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    /// Profile used when a frame does not name its device.
    default_device: &'static str,
    album_cache_capacity: u64,
}

/// Liveness probe. Reads configuration only; never touches the album host,
/// so a slow upstream cannot fail the probe.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "inkframe-serve",
        version: env!("CARGO_PKG_VERSION"),
        default_device: state.resolver.profile().name,
        album_cache_capacity: state.config.cache_capacity,
    })
}
