//! Error types for album photo resolution.
//!
//! Every failure the engine can surface is a [`ResolveError`]. Cache failures
//! are a separate [`CacheError`] that never leaves the cache layer, and
//! listing failures are a [`ListingError`] that the fetcher translates.

/// Errors surfaced by the resolution pipeline.
///
/// Display strings never embed the caller's URL; use
/// [`ResolveError::user_message`] for text shown to end users.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The album URL is missing, malformed, or points at the wrong domain.
    #[error("invalid album url: {0}")]
    InvalidUrl(&'static str),

    /// The album does not exist (or is no longer shared).
    #[error("album not found")]
    AlbumNotFound,

    /// The album exists but is not publicly accessible.
    #[error("album access denied")]
    AlbumAccessDenied,

    /// The album was reachable but contained no photos.
    #[error("album contains no photos")]
    EmptyAlbum,

    /// The listing collaborator failed for any other reason.
    #[error("album listing failed")]
    Transport(#[source] ListingError),

    /// An outbound URL failed the CDN whitelist. This is an internal bug,
    /// never bad input, and no photo data may be returned alongside it.
    #[error("security validation failed: {0}")]
    SecurityValidation(String),
}

impl ResolveError {
    /// Short machine-readable kind, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::AlbumNotFound => "album_not_found",
            Self::AlbumAccessDenied => "album_access_denied",
            Self::EmptyAlbum => "empty_album",
            Self::Transport(_) => "transport_error",
            Self::SecurityValidation(_) => "security_validation_failure",
        }
    }

    /// Generic, non-leaking message for end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => {
                "Please provide a valid shared Google Photos album link (https://photos.app.goo.gl/... or https://photos.google.com/share/...)."
            }
            Self::AlbumNotFound => "The album could not be found. Check that the link is correct.",
            Self::AlbumAccessDenied => {
                "The album is not publicly shared. Enable link sharing and try again."
            }
            Self::EmptyAlbum => "The album does not contain any photos yet.",
            Self::Transport(_) => "The photo service is temporarily unavailable. Please try again later.",
            Self::SecurityValidation(_) => "An internal error occurred. Please try again later.",
        }
    }

    /// Whether this error represents an internal invariant violation rather
    /// than a problem with the request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SecurityValidation(_))
    }
}

/// Failures reported by an album-listing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingError {
    /// Upstream reported the album as missing (HTTP 404).
    #[error("album listing returned 404 not found")]
    NotFound,

    /// Upstream refused access (HTTP 403).
    #[error("album listing returned 403 forbidden")]
    Forbidden,

    /// Upstream answered with another non-success status.
    #[error("album listing returned status {0}")]
    Status(u16),

    /// Network-level failure (DNS, TLS, timeout, connection reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream response could not be understood.
    #[error("unexpected album page format: {0}")]
    Parse(String),
}

/// Failures inside a key-value cache store. Absorbed by the cache layer.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The store could not be reached.
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the operation.
    #[error("cache operation failed: {0}")]
    Operation(String),

    /// A cached value could not be encoded or decoded.
    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
