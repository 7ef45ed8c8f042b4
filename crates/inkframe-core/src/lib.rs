//! Inkframe Core - random photo resolution for shared Google Photos albums.
//!
//! Given a public album link, this crate returns one randomly chosen photo
//! whose URL has been resized for an e-ink display, along with derived
//! metadata for rendering (aspect ratio, megapixels, relative date).
//!
//! # Architecture
//!
//! - **Validate**: [`album_url`] accepts only `photos.app.goo.gl` short links
//!   and `photos.google.com/share/...` full links
//! - **Fetch**: [`fetch`] runs a cache-aside lookup in front of an
//!   [`AlbumLister`] collaborator
//! - **Cache**: [`cache`] stores album listings in a TTL key/value store
//! - **Select**: [`select`] picks one photo uniformly at random
//! - **Optimize**: [`optimize`] appends CDN size directives per device profile
//! - **Resolve**: [`resolve`] composes all of the above
//!
//! # Security
//!
//! Every outbound photo URL is parsed and its host matched exactly against
//! `^lh[0-9]+\.googleusercontent\.com$` before it is returned. A failure is a
//! [`ResolveError::SecurityValidation`] and no photo data leaves the crate.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use inkframe_core::{AlbumCache, AlbumLister, PhotoResolver};
//!
//! async fn show(lister: Arc<dyn AlbumLister>) -> Result<(), inkframe_core::ResolveError> {
//!     let resolver = PhotoResolver::new(lister).with_cache(AlbumCache::in_memory(1_000));
//!     let photo = resolver
//!         .fetch_random_photo("https://photos.app.goo.gl/ABC123")
//!         .await?;
//!     println!("{} ({})", photo.photo_url, photo.aspect_ratio);
//!     Ok(())
//! }
//! ```

pub mod album_url;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod metadata;
pub mod optimize;
pub mod resolve;
pub mod select;

pub use album_url::{AlbumReference, UrlShape, parse_album_url};
pub use cache::{AlbumCache, CachedAlbumEntry, KvStore, MemoryStore};
pub use error::{CacheError, ListingError, ResolveError};
pub use listing::{AlbumLister, CaptionSource, RawPhotoRecord};
pub use optimize::{DEFAULT_PROFILE, DEVICE_PROFILES, DeviceProfile};
pub use resolve::{PhotoMetadata, PhotoResolver, ResolvedPhoto};
