//! Candidate entry and observation types.

use serde::{Deserialize, Serialize};

use crate::media::MediaReason;

/// Tab id used when the observing tab is unknown.
pub const UNKNOWN_TAB_ID: i64 = -1;

/// A media URL retained in the catalog.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCandidate {
    /// Unique key, trimmed.
    pub url: String,
    /// Page that issued the request, empty if unknown.
    #[serde(default)]
    pub page_url: String,
    #[serde(default = "unknown_tab")]
    pub tab_id: i64,
    #[serde(default)]
    pub content_type: String,
    pub reason: MediaReason,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub method: String,
    /// Number of times the URL has been observed; always at least 1.
    pub hits: u32,
    pub first_seen_at: i64,
    pub last_seen_at: i64,
}

fn unknown_tab() -> i64 {
    UNKNOWN_TAB_ID
}

/// One sighting of a media URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaObservation {
    pub url: String,
    pub page_url: String,
    pub tab_id: i64,
    pub content_type: String,
    pub reason: MediaReason,
    pub status_code: u16,
    pub method: String,
    /// When the response was seen, in epoch milliseconds.
    pub seen_at: i64,
}

impl MediaObservation {
    /// Builds an observation with empty metadata, mostly for tests and the CLI.
    #[must_use]
    pub fn new(url: impl Into<String>, reason: MediaReason, seen_at: i64) -> Self {
        Self {
            url: url.into(),
            page_url: String::new(),
            tab_id: UNKNOWN_TAB_ID,
            content_type: String::new(),
            reason,
            status_code: 0,
            method: String::new(),
            seen_at,
        }
    }

    /// Creates the first catalog entry for this URL.
    #[must_use]
    pub(crate) fn into_candidate(self, url: String) -> MediaCandidate {
        MediaCandidate {
            url,
            page_url: self.page_url,
            tab_id: self.tab_id,
            content_type: self.content_type,
            reason: self.reason,
            status_code: self.status_code,
            method: self.method,
            hits: 1,
            first_seen_at: self.seen_at,
            last_seen_at: self.seen_at,
        }
    }
}

impl MediaCandidate {
    /// Overwrites this entry with a newer sighting of the same URL.
    ///
    /// `hits` is incremented and `first_seen_at` is preserved.
    pub(crate) fn absorb(&mut self, observation: MediaObservation) {
        self.page_url = observation.page_url;
        self.tab_id = observation.tab_id;
        self.content_type = observation.content_type;
        self.reason = observation.reason;
        self.status_code = observation.status_code;
        self.method = observation.method;
        self.hits = self.hits.saturating_add(1);
        self.last_seen_at = observation.seen_at;
    }
}
