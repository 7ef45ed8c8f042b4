//! CDN URL rewriting and the CDN domain whitelist.
//!
//! Photo URLs are served from `lh{N}.googleusercontent.com` and accept a
//! trailing size directive:
//!
//! ```text
//! https://lh3.googleusercontent.com/pw/AP1Gcz...=w800-h480
//! ```
//!
//! The directive asks the CDN for an image that fits inside the box; aspect
//! ratio is preserved and nothing is cropped.
//!
//! # Security
//!
//! Every URL is parsed into components and its hostname matched exactly
//! against `^lh[0-9]+\.googleusercontent\.com$`. Prefix or substring checks
//! would admit hosts such as `lh3.googleusercontent.com.evil.example`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::{Host, Url};

use crate::album_url::MAX_URL_LEN;
use crate::error::ResolveError;

static CDN_HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^lh[0-9]+\.googleusercontent\.com$").unwrap());

/// A display target and the bounding box its photos are resized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    /// Lookup name, e.g. `"og"`.
    pub name: &'static str,
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
}

/// The primary display: an 800x480 landscape e-ink panel.
pub const DEFAULT_PROFILE: DeviceProfile = DeviceProfile {
    name: "og",
    width: 800,
    height: 480,
};

/// Known display targets. Extend freely; the optimizer only reads it.
pub const DEVICE_PROFILES: &[DeviceProfile] = &[
    DEFAULT_PROFILE,
    DeviceProfile {
        name: "og_portrait",
        width: 480,
        height: 800,
    },
    DeviceProfile {
        name: "x",
        width: 1872,
        height: 1404,
    },
    DeviceProfile {
        name: "kindle_2024",
        width: 1448,
        height: 1072,
    },
    DeviceProfile {
        name: "inkplate_10",
        width: 1200,
        height: 825,
    },
];

/// Bounding box for thumbnails (analysis only, never displayed).
pub const THUMBNAIL_WIDTH: u32 = 400;
pub const THUMBNAIL_HEIGHT: u32 = 240;

impl DeviceProfile {
    /// Look up a profile by case-insensitive name.
    pub fn by_name(name: &str) -> Option<Self> {
        let name = name.trim();
        DEVICE_PROFILES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Rewrite `url` for this profile's bounding box.
    pub fn optimize(&self, url: &str) -> Result<String, ResolveError> {
        optimize_photo_url(url, Some(self.width), Some(self.height))
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DEFAULT_PROFILE
    }
}

/// Check that `url` is an https URL on a whitelisted CDN host.
pub fn validate_cdn_url(url: &str) -> Result<Url, ResolveError> {
    if url.len() > MAX_URL_LEN {
        return Err(ResolveError::SecurityValidation("cdn url too long".to_string()));
    }

    let parsed = Url::parse(url)
        .map_err(|_| ResolveError::SecurityValidation("unparseable cdn url".to_string()))?;

    if parsed.scheme() != "https" {
        return Err(ResolveError::SecurityValidation(format!(
            "disallowed scheme '{}'",
            parsed.scheme()
        )));
    }

    match parsed.host() {
        Some(Host::Domain(host)) if CDN_HOST_RE.is_match(host) => {}
        _ => {
            return Err(ResolveError::SecurityValidation(
                "host is not a whitelisted cdn host".to_string(),
            ));
        }
    }

    if parsed.port().is_some() || !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(ResolveError::SecurityValidation(
            "cdn url carries port or credentials".to_string(),
        ));
    }

    Ok(parsed)
}

/// Append a `=w{width}-h{height}` resize directive to a CDN URL.
///
/// Missing (or zero) dimensions fall back to [`DEFAULT_PROFILE`]. An existing
/// directive is replaced rather than stacked. Both the input and the output
/// are checked against the CDN whitelist.
pub fn optimize_photo_url(
    url: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<String, ResolveError> {
    let mut parsed = validate_cdn_url(url)?;

    let width = width.filter(|w| *w > 0).unwrap_or(DEFAULT_PROFILE.width);
    let height = height.filter(|h| *h > 0).unwrap_or(DEFAULT_PROFILE.height);

    let path = strip_size_directive(parsed.path()).to_string();
    parsed.set_path(&format!("{path}=w{width}-h{height}"));

    let optimized = parsed.to_string();
    validate_cdn_url(&optimized)?;

    Ok(optimized)
}

/// Rewrite a CDN URL to the fixed thumbnail box.
pub fn optimize_thumbnail_url(url: &str) -> Result<String, ResolveError> {
    optimize_photo_url(url, Some(THUMBNAIL_WIDTH), Some(THUMBNAIL_HEIGHT))
}

/// Drop a trailing `=...` directive from the last path segment.
fn strip_size_directive(path: &str) -> &str {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[segment_start..].find('=') {
        Some(offset) => &path[..segment_start + offset],
        None => path,
    }
}
