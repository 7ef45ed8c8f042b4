//! Route definitions for the photo service.
//!
//! ## Routes
//!
//! - `GET /health` - Health check (JSON)
//! - `GET /robots.txt` - Crawler instructions
//! - `GET /api/photo` - Random photo from a shared album (JSON)

mod health;
pub mod photo;

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::state::AppState;

/// Build the complete service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/robots.txt", get(robots_txt))
        .route("/api/photo", get(photo::photo_handler))
        .with_state(state)
}

/// Serve robots.txt disallowing all crawlers. Nothing here is worth indexing.
async fn robots_txt() -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        "User-agent: *\nDisallow: /\n",
    )
}
