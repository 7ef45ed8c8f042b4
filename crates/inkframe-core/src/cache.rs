//! Cache-aside storage for album listings.
//!
//! Album contents are cached as serialized JSON under `album:{album_id}` in
//! an injected [`KvStore`]. The cache is strictly best-effort: store failures,
//! expired keys and undecodable entries all read as a miss, and failed writes
//! are logged and dropped.
//!
//! ## TTL
//!
//! Every entry lives for [`ALBUM_CACHE_TTL`] (1 hour) from the time it was
//! written. Expiry is the store's job; there is no invalidation API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::listing::RawPhotoRecord;

/// Lifetime of a cached album listing.
pub const ALBUM_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Prefix for album cache keys.
const KEY_PREFIX: &str = "album:";

/// Default capacity of [`MemoryStore`] (number of albums).
pub const DEFAULT_STORE_CAPACITY: u64 = 10_000;

/// Minimal key-value store the cache is layered on.
///
/// Both operations may fail; callers treat any failure as "not present".
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the bytes stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}

/// An album listing as stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAlbumEntry {
    /// Album identity the entry belongs to.
    pub album_id: String,
    /// When the listing was fetched from upstream.
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    /// Number of photos; always equal to `photos.len()` and never zero.
    pub photo_count: usize,
    /// The listing itself.
    pub photos: Vec<RawPhotoRecord>,
}

/// Album-level cache over a [`KvStore`].
#[derive(Clone)]
pub struct AlbumCache {
    store: Arc<dyn KvStore>,
}

impl AlbumCache {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Cache backed by an in-process [`MemoryStore`].
    pub fn in_memory(capacity: u64) -> Self {
        Self::new(Arc::new(MemoryStore::new(capacity)))
    }

    /// Store key for an album.
    pub fn key(album_id: &str) -> String {
        format!("{KEY_PREFIX}{album_id}")
    }

    /// Look up an album. Every failure mode is reported as a miss.
    pub async fn get(&self, album_id: &str) -> Option<CachedAlbumEntry> {
        let key = Self::key(album_id);

        let bytes = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(album_id = %album_id, "album cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(album_id = %album_id, error = %e, "album cache read failed");
                return None;
            }
        };

        match serde_json::from_slice::<CachedAlbumEntry>(&bytes) {
            Ok(entry) if !entry.photos.is_empty() => {
                tracing::debug!(
                    album_id = %album_id,
                    photo_count = entry.photo_count,
                    fetched_at = %entry.fetched_at,
                    "album cache hit"
                );
                Some(entry)
            }
            Ok(_) => {
                tracing::warn!(album_id = %album_id, "ignoring empty cached album");
                None
            }
            Err(e) => {
                // Corrupted entry - treat as a miss so the caller refetches
                tracing::warn!(album_id = %album_id, error = %e, "failed to decode cached album");
                None
            }
        }
    }

    /// Store an album listing. Empty listings are never cached and failures
    /// never reach the caller.
    pub async fn set(&self, album_id: &str, photos: &[RawPhotoRecord]) {
        if photos.is_empty() {
            tracing::debug!(album_id = %album_id, "not caching empty album");
            return;
        }

        let entry = CachedAlbumEntry {
            album_id: album_id.to_string(),
            fetched_at: chrono::Utc::now(),
            photo_count: photos.len(),
            photos: photos.to_vec(),
        };

        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(album_id = %album_id, error = %e, "failed to encode album for cache");
                return;
            }
        };

        match self.store.put(&Self::key(album_id), bytes, ALBUM_CACHE_TTL).await {
            Ok(()) => tracing::debug!(
                album_id = %album_id,
                photo_count = entry.photo_count,
                "album cached"
            ),
            Err(e) => {
                tracing::warn!(album_id = %album_id, error = %e, "album cache write failed");
            }
        }
    }
}

/// Stored bytes plus the TTL they were written with.
#[derive(Clone)]
struct StoredValue {
    bytes: Arc<[u8]>,
    ttl: Duration,
}

/// Expire each entry after the TTL given to its most recent `put`.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process [`KvStore`] backed by a moka cache with per-entry expiry.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Cache<String, StoredValue>,
}

impl MemoryStore {
    /// Create a store holding at most `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { inner }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_CAPACITY)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).await.map(|value| value.bytes.to_vec()))
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let value = StoredValue {
            bytes: value.into(),
            ttl,
        };
        self.inner.insert(key.to_string(), value).await;
        Ok(())
    }
}
