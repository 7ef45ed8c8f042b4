//! Google Photos shared-album scraper.
//!
//! The album page embeds its contents in a script block:
//!
//! ```text
//! AF_initDataCallback({key: 'ds:1', hash: '2', data:[null,[[uid,[url,w,h],updated,...],...]], sideChannel: {}});
//! ```
//!
//! The `data:` array is cut out with a string-aware bracket matcher and
//! parsed as JSON. The format is undocumented; entries that do not fit the
//! expected shape are skipped rather than failing the whole album.
//!
//! Captions are recovered heuristically while parsing and remembered per
//! photo uid, so the lister doubles as a [`CaptionSource`].

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use inkframe_core::cache::ALBUM_CACHE_TTL;
use inkframe_core::{AlbumLister, CaptionSource, ListingError, RawPhotoRecord};
use moka::sync::Cache;
use regex::Regex;
use serde_json::Value;

static DATA_CALLBACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AF_initDataCallback\(\{\s*key:\s*'ds:1'").unwrap());

/// Long runs of base64-ish characters: ids, tokens, hashes.
static OPAQUE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9+/_=-]{24,}").unwrap());

/// Caption slots reserved per cached album. Albums with more captioned
/// photos than this may lose captions to eviction before their listing
/// expires; captions are best-effort, so that only drops the text.
pub const CAPTIONS_PER_ALBUM: u64 = 100;

/// Upper bound on an album page body. Large albums run to a few MB.
pub const MAX_PAGE_BYTES: usize = 32 * 1024 * 1024;

const MAX_CAPTION_DEPTH: usize = 4;
const MAX_CAPTION_CHARS: usize = 500;
const MAX_SINGLE_WORD_CAPTION_CHARS: usize = 40;

/// Photos and captions recovered from one album page.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedAlbum {
    pub photos: Vec<RawPhotoRecord>,
    /// `(uid, caption)` pairs for photos with a recognised caption.
    pub captions: Vec<(String, String)>,
}

/// [`AlbumLister`] that scrapes the public album page over HTTPS.
pub struct GooglePhotosLister {
    client: reqwest::Client,
    captions: Cache<String, String>,
}

impl GooglePhotosLister {
    /// Build a lister whose requests time out after `timeout`, remembering
    /// captions for up to `album_capacity` albums.
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        album_capacity: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        let captions = Cache::builder()
            .max_capacity(caption_capacity(album_capacity))
            .time_to_live(ALBUM_CACHE_TTL)
            .build();

        Ok(Self { client, captions })
    }

    fn remember_captions(&self, captions: Vec<(String, String)>) {
        for (uid, caption) in captions {
            self.captions.insert(uid, caption);
        }
    }
}

#[async_trait]
impl AlbumLister for GooglePhotosLister {
    async fn fetch_image_urls(&self, album_url: &str) -> Result<Vec<RawPhotoRecord>, ListingError> {
        // Short links redirect to the full share page; reqwest follows them.
        let response = self
            .client
            .get(album_url)
            .send()
            .await
            .map_err(|e| ListingError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        match status.as_u16() {
            404 => return Err(ListingError::NotFound),
            403 => return Err(ListingError::Forbidden),
            code if !status.is_success() => return Err(ListingError::Status(code)),
            _ => {}
        }

        let html = read_capped_body(response, MAX_PAGE_BYTES).await?;

        let parsed = parse_album_page(&html)?;
        tracing::debug!(
            photo_count = parsed.photos.len(),
            caption_count = parsed.captions.len(),
            "album page parsed"
        );

        self.remember_captions(parsed.captions);
        Ok(parsed.photos)
    }
}

impl CaptionSource for GooglePhotosLister {
    fn caption_for(&self, uid: &str) -> Option<String> {
        self.captions.get(uid)
    }
}

/// Caption cache capacity for an album cache holding `album_capacity` albums.
pub fn caption_capacity(album_capacity: u64) -> u64 {
    album_capacity.max(1).saturating_mul(CAPTIONS_PER_ALBUM)
}

/// Read the response body, failing once it exceeds `limit` bytes.
async fn read_capped_body(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<String, ListingError> {
    if let Some(len) = response.content_length()
        && len > limit as u64
    {
        return Err(page_too_large(limit));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ListingError::Transport(e.without_url().to_string()))?
    {
        append_capped(&mut body, &chunk, limit)?;
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn append_capped(body: &mut Vec<u8>, chunk: &[u8], limit: usize) -> Result<(), ListingError> {
    if body.len() + chunk.len() > limit {
        return Err(page_too_large(limit));
    }
    body.extend_from_slice(chunk);
    Ok(())
}

fn page_too_large(limit: usize) -> ListingError {
    ListingError::Parse(format!("album page exceeds {limit} bytes"))
}

/// Extract photos and captions from an album page.
pub fn parse_album_page(html: &str) -> Result<ParsedAlbum, ListingError> {
    let data = extract_data_block(html)
        .ok_or_else(|| ListingError::Parse("album data block not found".to_string()))?;

    let value: Value = serde_json::from_str(data)
        .map_err(|e| ListingError::Parse(format!("album data is not valid json: {e}")))?;

    let entries: &[Value] = match value.get(1) {
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => return Err(ListingError::Parse("photo list is not an array".to_string())),
    };

    let mut parsed = ParsedAlbum::default();
    for entry in entries {
        let Some(fields) = entry.as_array() else {
            continue;
        };
        let Some(photo) = parse_photo_entry(fields) else {
            continue;
        };
        if let Some(caption) = find_caption(fields, &photo.uid) {
            parsed.captions.push((photo.uid.clone(), caption));
        }
        parsed.photos.push(photo);
    }

    if parsed.photos.len() < entries.len() {
        tracing::debug!(
            skipped = entries.len() - parsed.photos.len(),
            "skipped unrecognised album entries"
        );
    }

    Ok(parsed)
}

/// Slice of `html` holding the `data:` array of the `ds:1` callback.
fn extract_data_block(html: &str) -> Option<&str> {
    let callback = DATA_CALLBACK_RE.find(html)?;
    let rest = &html[callback.end()..];
    let data_start = rest.find("data:")? + "data:".len();
    let data = rest[data_start..].trim_start();

    if !data.starts_with('[') {
        return None;
    }

    let end = matching_bracket_end(data)?;
    Some(&data[..end])
}

/// Byte offset just past the bracket closing the one at the start of `text`.
///
/// Brackets inside double-quoted strings (including escaped quotes) are
/// ignored.
fn matching_bracket_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// `[uid, [url, width, height, ...], image_update_date, _, _, album_add_date, ...]`
fn parse_photo_entry(fields: &[Value]) -> Option<RawPhotoRecord> {
    let uid = fields.first()?.as_str()?.trim();
    let media = fields.get(1)?.as_array()?;
    let url = media.first()?.as_str()?.trim();

    if uid.is_empty() || url.is_empty() {
        return None;
    }

    let width = u32::try_from(media.get(1)?.as_u64()?).ok()?;
    let height = u32::try_from(media.get(2)?.as_u64()?).ok()?;
    let image_update_date = as_millis(fields.get(2)?)?;
    let album_add_date = fields
        .get(5)
        .and_then(as_millis)
        .unwrap_or(image_update_date);

    Some(RawPhotoRecord {
        uid: uid.to_string(),
        url: url.to_string(),
        width,
        height,
        image_update_date,
        album_add_date,
    })
}

fn as_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// First caption-like string among the entry's trailing fields.
fn find_caption(fields: &[Value], uid: &str) -> Option<String> {
    fields
        .iter()
        .skip(2)
        .find_map(|field| scan_for_caption(field, uid, 0))
}

fn scan_for_caption(value: &Value, uid: &str, depth: usize) -> Option<String> {
    if depth > MAX_CAPTION_DEPTH {
        return None;
    }

    match value {
        Value::String(s) => looks_like_caption(s, uid).then(|| s.trim().to_string()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| scan_for_caption(item, uid, depth + 1)),
        Value::Object(map) => map
            .values()
            .find_map(|item| scan_for_caption(item, uid, depth + 1)),
        _ => None,
    }
}

fn looks_like_caption(candidate: &str, uid: &str) -> bool {
    let text = candidate.trim();
    let chars = text.chars().count();

    if chars == 0 || chars > MAX_CAPTION_CHARS || text == uid {
        return false;
    }
    if text.contains("://") || text.starts_with("www.") || text.starts_with('/') {
        return false;
    }
    if OPAQUE_TOKEN_RE.is_match(text) {
        return false;
    }
    if !text.chars().any(char::is_alphabetic) {
        return false;
    }

    text.contains(' ')
        || (chars <= MAX_SINGLE_WORD_CAPTION_CHARS
            && text.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-'))
}
