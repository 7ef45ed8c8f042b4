//! Album URL validation and album-identity extraction.
//!
//! Two URL shapes are accepted:
//!
//! ```text
//! https://photos.app.goo.gl/{code}            (short link)
//! https://photos.google.com/share/{id}[?key=] (full share link)
//! ```
//!
//! The identity segment becomes the album id, which doubles as the cache key.
//!
//! # Normalization Rules
//!
//! - Surrounding whitespace and a single trailing slash are ignored
//! - Host case is ignored
//! - The query string of a full link is dropped before extraction
//!
//! # Rejection Rules
//!
//! - Empty input, URLs longer than [`MAX_URL_LEN`], identities longer than
//!   [`MAX_ALBUM_ID_LEN`]
//! - Control characters, null bytes, whitespace and any non-ASCII character
//! - Any scheme other than `https`
//! - Any host other than the two album hosts, explicit ports and userinfo

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::ResolveError;

/// Host serving short album links.
pub const SHORT_LINK_HOST: &str = "photos.app.goo.gl";

/// Host serving full album share links.
pub const FULL_HOST: &str = "photos.google.com";

/// Maximum accepted URL length in bytes.
pub const MAX_URL_LEN: usize = 2048;

/// Maximum accepted album identity length.
pub const MAX_ALBUM_ID_LEN: usize = 200;

static ALBUM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("album id pattern is valid"));

/// Which of the supported URL shapes a reference was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlShape {
    /// `https://photos.app.goo.gl/{code}`
    Short,
    /// `https://photos.google.com/share/{id}`
    Full,
}

impl fmt::Display for UrlShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => f.write_str("short"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// A validated album URL and the identity derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumReference {
    raw_url: String,
    album_id: String,
    shape: UrlShape,
}

impl AlbumReference {
    /// The URL as supplied by the caller (trimmed).
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    /// Canonical album identity.
    pub fn album_id(&self) -> &str {
        &self.album_id
    }

    /// Shape the URL was recognised as.
    pub fn shape(&self) -> UrlShape {
        self.shape
    }
}

/// Validate an album URL and extract its identity.
///
/// # Examples
///
/// ```
/// use inkframe_core::album_url::{parse_album_url, UrlShape};
///
/// let album = parse_album_url("https://photos.app.goo.gl/ABC123").unwrap();
/// assert_eq!(album.album_id(), "ABC123");
/// assert_eq!(album.shape(), UrlShape::Short);
/// ```
pub fn parse_album_url(input: &str) -> Result<AlbumReference, ResolveError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ResolveError::InvalidUrl("required"));
    }

    if input.len() > MAX_URL_LEN {
        return Err(ResolveError::InvalidUrl("too long"));
    }

    if input
        .chars()
        .any(|c| !c.is_ascii() || c.is_ascii_control() || c.is_ascii_whitespace())
    {
        return Err(ResolveError::InvalidUrl("invalid characters"));
    }

    let parsed = Url::parse(input).map_err(|_| ResolveError::InvalidUrl("unrecognized album url"))?;

    if parsed.scheme() != "https" {
        return Err(ResolveError::InvalidUrl("https required"));
    }

    let host = parsed.host_str().unwrap_or_default();
    let shape = match host {
        SHORT_LINK_HOST => UrlShape::Short,
        FULL_HOST => UrlShape::Full,
        _ => return Err(ResolveError::InvalidUrl("wrong domain")),
    };

    // Ports and credentials are never part of a share link.
    if parsed.port().is_some() || !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(ResolveError::InvalidUrl("wrong domain"));
    }

    if parsed.fragment().is_some() {
        return Err(ResolveError::InvalidUrl("unrecognized album url"));
    }

    let path = parsed.path();
    let path = path.strip_suffix('/').unwrap_or(path);

    let segment = match shape {
        UrlShape::Short => {
            if parsed.query().is_some() {
                return Err(ResolveError::InvalidUrl("unrecognized album url"));
            }
            path.strip_prefix('/')
        }
        UrlShape::Full => path.strip_prefix("/share/"),
    }
    .ok_or(ResolveError::InvalidUrl("unrecognized album url"))?;

    let album_id = validate_album_id(segment)?;

    Ok(AlbumReference {
        raw_url: input.to_string(),
        album_id: album_id.to_string(),
        shape,
    })
}

/// Check an identity segment against the allowed character class and length.
fn validate_album_id(segment: &str) -> Result<&str, ResolveError> {
    if segment.len() > MAX_ALBUM_ID_LEN {
        return Err(ResolveError::InvalidUrl("album id too long"));
    }

    if !ALBUM_ID_RE.is_match(segment) {
        return Err(ResolveError::InvalidUrl("unrecognized album url"));
    }

    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_reason(input: &str) -> &'static str {
        match parse_album_url(input) {
            Err(ResolveError::InvalidUrl(reason)) => reason,
            other => panic!("expected InvalidUrl for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn short_link_parses() {
        let album = parse_album_url("https://photos.app.goo.gl/ABC123").unwrap();
        assert_eq!(album.album_id(), "ABC123");
        assert_eq!(album.shape(), UrlShape::Short);
        assert_eq!(album.raw_url(), "https://photos.app.goo.gl/ABC123");
    }

    #[test]
    fn short_link_allows_hyphen_and_underscore() {
        let album = parse_album_url("https://photos.app.goo.gl/a-B_c9").unwrap();
        assert_eq!(album.album_id(), "a-B_c9");
    }

    #[test]
    fn full_link_parses() {
        let album =
            parse_album_url("https://photos.google.com/share/AF1QipMxyz_-09").unwrap();
        assert_eq!(album.album_id(), "AF1QipMxyz_-09");
        assert_eq!(album.shape(), UrlShape::Full);
    }

    #[test]
    fn full_link_identity_ignores_query_string() {
        let bare = parse_album_url("https://photos.google.com/share/AF1Qip123").unwrap();
        let keyed =
            parse_album_url("https://photos.google.com/share/AF1Qip123?key=abcDEF").unwrap();
        let other_key =
            parse_album_url("https://photos.google.com/share/AF1Qip123?key=zzz&hl=en").unwrap();

        assert_eq!(bare.album_id(), keyed.album_id());
        assert_eq!(keyed.album_id(), other_key.album_id());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let short = parse_album_url("https://photos.app.goo.gl/ABC123/").unwrap();
        assert_eq!(short.album_id(), "ABC123");

        let full = parse_album_url("https://photos.google.com/share/AF1Qip123/?key=x").unwrap();
        assert_eq!(full.album_id(), "AF1Qip123");
    }

    #[test]
    fn host_case_is_ignored() {
        let album = parse_album_url("https://PHOTOS.APP.GOO.GL/ABC123").unwrap();
        assert_eq!(album.album_id(), "ABC123");
    }

    #[test]
    fn parsing_is_deterministic() {
        let url = "https://photos.google.com/share/AF1Qip123?key=abc";
        assert_eq!(parse_album_url(url).unwrap(), parse_album_url(url).unwrap());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let album = parse_album_url("  https://photos.app.goo.gl/ABC123\n").unwrap();
        assert_eq!(album.raw_url(), "https://photos.app.goo.gl/ABC123");
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(invalid_reason(""), "required");
        assert_eq!(invalid_reason("   "), "required");
    }

    #[test]
    fn http_scheme_rejected() {
        assert_eq!(invalid_reason("http://photos.app.goo.gl/ABC123"), "https required");
    }

    #[test]
    fn script_scheme_rejected() {
        assert_eq!(invalid_reason("javascript:alert(1)"), "https required");
    }

    #[test]
    fn wrong_domain_rejected() {
        assert_eq!(invalid_reason("https://example.com/ABC123"), "wrong domain");
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl.evil.example/ABC123"),
            "wrong domain"
        );
        assert_eq!(
            invalid_reason("https://evil.example/share/AF1Qip123"),
            "wrong domain"
        );
    }

    #[test]
    fn ports_and_userinfo_rejected() {
        assert_eq!(invalid_reason("https://photos.app.goo.gl:8443/ABC123"), "wrong domain");
        assert_eq!(
            invalid_reason("https://user:pw@photos.google.com/share/AF1Qip123"),
            "wrong domain"
        );
    }

    #[test]
    fn wrong_path_rejected() {
        assert_eq!(
            invalid_reason("https://photos.google.com/album/AF1Qip123"),
            "unrecognized album url"
        );
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/ABC/123"),
            "unrecognized album url"
        );
        assert_eq!(invalid_reason("https://photos.app.goo.gl/"), "unrecognized album url");
        assert_eq!(
            invalid_reason("https://photos.google.com/share/"),
            "unrecognized album url"
        );
    }

    #[test]
    fn short_link_query_rejected() {
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/ABC123?x=1"),
            "unrecognized album url"
        );
    }

    #[test]
    fn fragment_rejected() {
        assert_eq!(
            invalid_reason("https://photos.google.com/share/AF1Qip123#top"),
            "unrecognized album url"
        );
    }

    #[test]
    fn control_and_null_characters_rejected() {
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/ABC\0123"),
            "invalid characters"
        );
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/ABC\u{7}123"),
            "invalid characters"
        );
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/ABC 123"),
            "invalid characters"
        );
    }

    #[test]
    fn non_ascii_and_emoji_rejected() {
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/ABC\u{1F600}"),
            "invalid characters"
        );
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/caf\u{e9}"),
            "invalid characters"
        );
    }

    #[test]
    fn percent_encoded_identity_rejected() {
        assert_eq!(
            invalid_reason("https://photos.app.goo.gl/ABC%00123"),
            "unrecognized album url"
        );
    }

    #[test]
    fn url_at_length_limit_accepted() {
        let prefix = "https://photos.google.com/share/AF1Qip?key=";
        let at_limit = format!("{prefix}{}", "a".repeat(MAX_URL_LEN - prefix.len()));
        assert_eq!(at_limit.len(), MAX_URL_LEN);

        let album = parse_album_url(&at_limit).unwrap();
        assert_eq!(album.album_id(), "AF1Qip");
        assert_eq!(album.raw_url(), at_limit);

        let over = format!("{at_limit}a");
        assert_eq!(invalid_reason(&over), "too long");
    }

    #[test]
    fn overlong_url_rejected() {
        let url = format!("https://photos.google.com/share/AF1Qip?key={}", "a".repeat(2100));
        assert_eq!(invalid_reason(&url), "too long");
    }

    #[test]
    fn overlong_identity_rejected() {
        let at_limit = format!("https://photos.app.goo.gl/{}", "a".repeat(MAX_ALBUM_ID_LEN));
        assert!(parse_album_url(&at_limit).is_ok());

        let over = format!("https://photos.app.goo.gl/{}", "a".repeat(MAX_ALBUM_ID_LEN + 1));
        assert_eq!(invalid_reason(&over), "album id too long");
    }

    #[test]
    fn shape_display() {
        assert_eq!(UrlShape::Short.to_string(), "short");
        assert_eq!(UrlShape::Full.to_string(), "full");
    }
}
