//! Application state shared across all request handlers.

use std::sync::Arc;

use inkframe_core::{AlbumCache, PhotoResolver};

use crate::config::Config;
use crate::lister::GooglePhotosLister;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Album-to-photo resolver, with its album cache and caption source.
    pub resolver: Arc<PhotoResolver>,
}

impl AppState {
    /// Create the production state: scraping lister, in-memory album cache,
    /// and the configured default device profile.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let lister = Arc::new(GooglePhotosLister::new(
            config.fetch_timeout,
            &config.user_agent,
            config.cache_capacity,
        )?);

        let resolver = PhotoResolver::new(lister.clone())
            .with_cache(AlbumCache::in_memory(config.cache_capacity))
            .with_profile(config.default_device)
            .with_captions(lister);

        tracing::info!(
            cache_capacity = config.cache_capacity,
            cache_ttl_secs = inkframe_core::cache::ALBUM_CACHE_TTL.as_secs(),
            caption_capacity = crate::lister::caption_capacity(config.cache_capacity),
            default_device = config.default_device.name,
            "application state initialized"
        );

        Ok(Self::with_resolver(config, resolver))
    }

    /// Create state around an already-built resolver.
    pub fn with_resolver(config: Config, resolver: PhotoResolver) -> Self {
        Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
        }
    }
}
