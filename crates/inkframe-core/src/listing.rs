//! Album-listing collaborator interface.
//!
//! The engine never talks to the photo provider directly. Anything that can
//! turn a shared album URL into a list of [`RawPhotoRecord`]s implements
//! [`AlbumLister`]; the HTTP scraper lives in the service crate and tests use
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ListingError;

/// One photo as reported by the listing collaborator. Never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPhotoRecord {
    /// Provider-assigned photo identity.
    pub uid: String,
    /// Base CDN URL, without a size directive.
    pub url: String,
    /// Original width in pixels.
    pub width: u32,
    /// Original height in pixels.
    pub height: u32,
    /// Last modification time, Unix epoch milliseconds.
    pub image_update_date: i64,
    /// Time the photo was added to the album, Unix epoch milliseconds.
    pub album_add_date: i64,
}

/// Source of album contents.
#[async_trait]
pub trait AlbumLister: Send + Sync {
    /// List every photo in the album at `album_url`.
    ///
    /// An empty vector is a valid answer; the fetcher turns it into
    /// [`crate::ResolveError::EmptyAlbum`].
    async fn fetch_image_urls(&self, album_url: &str) -> Result<Vec<RawPhotoRecord>, ListingError>;
}

/// Best-effort caption lookup.
///
/// Captions come from heuristic scanning of an undocumented provider format.
/// Implementations return `None` whenever unsure; resolution never depends on
/// a caption being present.
pub trait CaptionSource: Send + Sync {
    /// Caption for the photo with the given uid, if one was recognised.
    fn caption_for(&self, uid: &str) -> Option<String>;
}
