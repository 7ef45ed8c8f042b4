//! Cache-aside album fetching.
//!
//! On a hit the cached listing is returned without contacting upstream. On a
//! miss the [`AlbumLister`] is called with the caller's original URL, its
//! failures are translated into [`ResolveError`] kinds, and a non-empty
//! listing is written back to the cache before it is returned.
//!
//! Concurrent misses on the same album are not coalesced: each caller fetches
//! upstream and writes the cache, and the last write wins.

use crate::album_url::AlbumReference;
use crate::cache::AlbumCache;
use crate::error::{ListingError, ResolveError};
use crate::listing::{AlbumLister, RawPhotoRecord};

/// Return the album's photos, from cache when possible.
pub async fn fetch_album_photos(
    album: &AlbumReference,
    lister: &dyn AlbumLister,
    cache: Option<&AlbumCache>,
) -> Result<Vec<RawPhotoRecord>, ResolveError> {
    if let Some(cache) = cache
        && let Some(entry) = cache.get(album.album_id()).await
    {
        return Ok(entry.photos);
    }

    tracing::debug!(
        album_id = %album.album_id(),
        shape = %album.shape(),
        "fetching album from upstream"
    );

    let photos = lister
        .fetch_image_urls(album.raw_url())
        .await
        .map_err(|e| {
            let err = translate_listing_error(e);
            tracing::info!(album_id = %album.album_id(), kind = err.kind(), "album fetch failed");
            err
        })?;

    if photos.is_empty() {
        tracing::info!(album_id = %album.album_id(), "album is empty");
        return Err(ResolveError::EmptyAlbum);
    }

    tracing::debug!(
        album_id = %album.album_id(),
        photo_count = photos.len(),
        "album fetched"
    );

    if let Some(cache) = cache {
        cache.set(album.album_id(), &photos).await;
    }

    Ok(photos)
}

/// Map a listing failure onto the domain error taxonomy.
///
/// Typed statuses map directly; free-form transport and parse messages are
/// also checked for 404/403 wording, since some collaborators only report
/// failures as text.
pub fn translate_listing_error(err: ListingError) -> ResolveError {
    let message = match &err {
        ListingError::Transport(msg) | ListingError::Parse(msg) => msg.to_ascii_lowercase(),
        _ => String::new(),
    };

    match err {
        ListingError::NotFound | ListingError::Status(404) => ResolveError::AlbumNotFound,
        ListingError::Forbidden | ListingError::Status(403) => ResolveError::AlbumAccessDenied,
        _ if message.contains("404") || message.contains("not found") => {
            ResolveError::AlbumNotFound
        }
        _ if message.contains("403") || message.contains("forbidden") => {
            ResolveError::AlbumAccessDenied
        }
        other => ResolveError::Transport(other),
    }
}
