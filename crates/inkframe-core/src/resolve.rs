//! Album URL to display-ready photo resolution.
//!
//! [`PhotoResolver`] is the composition root of the engine. It owns the
//! listing collaborator, the optional album cache and the target device
//! profile, and runs the pipeline:
//!
//! 1. Validate the album URL and extract its identity
//! 2. Fetch the listing (cache-aside)
//! 3. Pick one photo uniformly at random
//! 4. Rewrite its URLs for the device and for thumbnails, derive metadata
//! 5. Re-validate every outbound URL before returning
//!
//! Repeated calls are independent; the only side effect is cache population.

use std::sync::Arc;

use serde::Serialize;

use crate::album_url::parse_album_url;
use crate::cache::AlbumCache;
use crate::error::ResolveError;
use crate::fetch::fetch_album_photos;
use crate::listing::{AlbumLister, CaptionSource, RawPhotoRecord};
use crate::metadata::{
    Orientation, calculate_aspect_ratio, calculate_megapixels, epoch_millis_to_rfc3339,
    format_relative_date, orientation,
};
use crate::optimize::{DeviceProfile, optimize_thumbnail_url, validate_cdn_url};
use crate::select::select_random_photo;

/// Album name reported when the provider does not expose one.
pub const DEFAULT_ALBUM_NAME: &str = "Google Photos";

/// Raw attributes of the selected photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoMetadata {
    /// Provider photo identity.
    pub uid: String,
    /// Original width in pixels.
    pub width: u32,
    /// Original height in pixels.
    pub height: u32,
    /// Landscape, portrait or square.
    pub orientation: Orientation,
    /// When the photo was added to the album (RFC 3339).
    pub album_add_date: Option<String>,
    /// Device profile the photo URL was sized for.
    pub device: &'static str,
    /// Bounding box width requested from the CDN.
    pub device_width: u32,
    /// Bounding box height requested from the CDN.
    pub device_height: u32,
}

/// A single photo, ready for display. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPhoto {
    /// CDN URL sized for the target device.
    pub photo_url: String,
    /// CDN URL sized for thumbnails.
    pub thumbnail_url: String,
    /// Best-effort caption.
    pub caption: Option<String>,
    /// Photo modification time (RFC 3339).
    pub timestamp: Option<String>,
    /// Photo modification time, Unix epoch milliseconds.
    pub image_update_date: i64,
    /// Album display name.
    pub album_name: String,
    /// Number of photos in the album.
    pub photo_count: usize,
    /// Human-relative age, e.g. `"2 years ago"`.
    pub relative_date: String,
    /// Readable aspect ratio, e.g. `"4:3"`.
    pub aspect_ratio: String,
    /// Megapixels rounded to the nearest 0.5.
    pub megapixels: f64,
    /// Raw attributes.
    pub metadata: PhotoMetadata,
}

/// Resolves shared album URLs into random display-ready photos.
#[derive(Clone)]
pub struct PhotoResolver {
    lister: Arc<dyn AlbumLister>,
    cache: Option<AlbumCache>,
    profile: DeviceProfile,
    captions: Option<Arc<dyn CaptionSource>>,
}

impl PhotoResolver {
    /// Resolver with no cache, the default device profile and no captions.
    pub fn new(lister: Arc<dyn AlbumLister>) -> Self {
        Self {
            lister,
            cache: None,
            profile: DeviceProfile::default(),
            captions: None,
        }
    }

    /// Use `cache` for album listings.
    pub fn with_cache(mut self, cache: AlbumCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Size photos for `profile` unless a call overrides it.
    pub fn with_profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Attach a caption source.
    pub fn with_captions(mut self, captions: Arc<dyn CaptionSource>) -> Self {
        self.captions = Some(captions);
        self
    }

    /// The default device profile.
    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    /// Resolve one random photo for the default device profile.
    pub async fn fetch_random_photo(&self, album_url: &str) -> Result<ResolvedPhoto, ResolveError> {
        self.fetch_random_photo_for(album_url, self.profile).await
    }

    /// Resolve one random photo sized for `profile`.
    pub async fn fetch_random_photo_for(
        &self,
        album_url: &str,
        profile: DeviceProfile,
    ) -> Result<ResolvedPhoto, ResolveError> {
        let album = parse_album_url(album_url)?;
        let photos = fetch_album_photos(&album, self.lister.as_ref(), self.cache.as_ref()).await?;
        let photo = select_random_photo(&photos)?;

        let caption = self
            .captions
            .as_ref()
            .and_then(|source| source.caption_for(&photo.uid));

        let resolved = build_resolved_photo(photo, photos.len(), profile, caption)?;

        if let Err(e) = validate_resolved_photo(&resolved) {
            tracing::error!(
                album_id = %album.album_id(),
                uid = %photo.uid,
                error = %e,
                "resolved photo failed final security validation"
            );
            return Err(e);
        }

        tracing::debug!(
            album_id = %album.album_id(),
            uid = %photo.uid,
            device = profile.name,
            "photo resolved"
        );

        Ok(resolved)
    }
}

/// Assemble a [`ResolvedPhoto`] from a raw record.
pub fn build_resolved_photo(
    photo: &RawPhotoRecord,
    photo_count: usize,
    profile: DeviceProfile,
    caption: Option<String>,
) -> Result<ResolvedPhoto, ResolveError> {
    let photo_url = profile.optimize(&photo.url)?;
    let thumbnail_url = optimize_thumbnail_url(&photo.url)?;

    let timestamp = epoch_millis_to_rfc3339(photo.image_update_date);
    let relative_date = timestamp
        .as_deref()
        .map(format_relative_date)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(ResolvedPhoto {
        photo_url,
        thumbnail_url,
        caption: caption.filter(|c| !c.trim().is_empty()),
        timestamp,
        image_update_date: photo.image_update_date,
        album_name: DEFAULT_ALBUM_NAME.to_string(),
        photo_count,
        relative_date,
        aspect_ratio: calculate_aspect_ratio(photo.width, photo.height),
        megapixels: calculate_megapixels(photo.width, photo.height),
        metadata: PhotoMetadata {
            uid: photo.uid.clone(),
            width: photo.width,
            height: photo.height,
            orientation: orientation(photo.width, photo.height),
            album_add_date: epoch_millis_to_rfc3339(photo.album_add_date),
            device: profile.name,
            device_width: profile.width,
            device_height: profile.height,
        },
    })
}

/// Re-check every outbound URL of a resolved photo against the CDN whitelist.
pub fn validate_resolved_photo(photo: &ResolvedPhoto) -> Result<(), ResolveError> {
    validate_cdn_url(&photo.photo_url)?;
    validate_cdn_url(&photo.thumbnail_url)?;
    Ok(())
}
