//! Random photo endpoint.
//!
//! `GET /api/photo?album_url=...&device=...` returns a freshly selected
//! photo as JSON. Every call is a new random pick, so responses are marked
//! `no-store`.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use inkframe_core::DeviceProfile;
use serde::Deserialize;

use crate::error::ServeError;
use crate::state::AppState;

/// Query parameters for the photo endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PhotoQuery {
    /// Shared album link. Missing is treated like empty and rejected.
    pub album_url: Option<String>,
    /// Device profile name; the configured default when absent.
    pub device: Option<String>,
}

pub async fn photo_handler(
    State(state): State<AppState>,
    Query(query): Query<PhotoQuery>,
) -> Result<Response, ServeError> {
    let profile = match query.device.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => DeviceProfile::by_name(name)
            .ok_or_else(|| ServeError::UnknownDevice(name.to_string()))?,
        _ => state.resolver.profile(),
    };

    let album_url = query.album_url.unwrap_or_default();
    let photo = state
        .resolver
        .fetch_random_photo_for(&album_url, profile)
        .await?;

    Ok(([(header::CACHE_CONTROL, "no-store")], Json(photo)).into_response())
}
