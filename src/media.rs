//! Heuristic detection of streaming-media resources.
//!
//! Classification looks at two things, in order:
//! 1. the URL path's file extension (query and fragment ignored)
//! 2. the response `Content-Type`, parameters stripped
//!
//! The detector is scheme-agnostic; callers only feed it `http`/`https` URLs.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Media file extensions, matched at the end of the URL path.
#[allow(clippy::expect_used)]
static MEDIA_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^?#]*\.(?:mp4|webm|mkv|mov|m4v|avi|flv|ts|m3u8|mpd)(?:[?#]|$)")
        .expect("media extension regex is valid") // Static pattern, safe to panic
});

/// MIME type prefixes treated as streaming media.
const MEDIA_MIME_PREFIXES: [&str; 4] = [
    "video/",
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "application/dash+xml",
];

/// Why a URL was classified as media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaReason {
    /// The URL path ends in a known media extension.
    #[serde(rename = "extension")]
    Extension,
    /// The response declared a media content type.
    #[serde(rename = "content-type")]
    ContentType,
}

impl MediaReason {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::ContentType => "content-type",
        }
    }
}

impl fmt::Display for MediaReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a `(url, content_type)` pair.
///
/// Returns `None` when neither the extension nor the content type looks like
/// media, in which case the caller must take no action.
///
/// # Examples
///
/// ```
/// use flamingo_bridge::media::{MediaReason, detect};
///
/// assert_eq!(detect("https://cdn.example.com/v/master.M3U8?sig=1", ""), Some(MediaReason::Extension));
/// assert_eq!(detect("https://cdn.example.com/chunk", "video/mp4; codecs=avc1"), Some(MediaReason::ContentType));
/// assert_eq!(detect("https://example.com/index.html", "text/html"), None);
/// ```
#[must_use]
pub fn detect(url: &str, content_type: &str) -> Option<MediaReason> {
    if MEDIA_EXT_RE.is_match(url) {
        return Some(MediaReason::Extension);
    }
    if is_media_content_type(content_type) {
        return Some(MediaReason::ContentType);
    }
    None
}

/// Tests a raw `Content-Type` header value against the media MIME prefixes.
#[must_use]
pub fn is_media_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    !mime.is_empty()
        && MEDIA_MIME_PREFIXES
            .iter()
            .any(|prefix| mime.starts_with(prefix))
}
