//! Inkframe Serve - HTTP front end for the album photo resolver.
//!
//! E-ink photo frames call this service with a shared Google Photos album
//! link and receive one random photo, resized for their panel, as JSON.
//!
//! # Architecture
//!
//! - **Lister**: Scrapes the public album page (reqwest) and recovers captions
//! - **Resolve**: `inkframe-core` validates, caches, selects and optimizes
//! - **Cache**: In-process moka caches for album listings and captions
//!
//! # URL Pattern
//!
//! ```text
//! GET /api/photo?album_url={shared_album_link}&device={profile}
//! ```
//!
//! # Security
//!
//! - Only `photos.app.goo.gl` and `photos.google.com/share/` links are fetched
//! - Returned photo URLs are whitelisted to `lh*.googleusercontent.com`
//! - Error bodies are generic and never echo the submitted URL

pub mod config;
pub mod error;
pub mod lister;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
