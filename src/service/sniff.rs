//! Media capture from response headers.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::activity::{ActivityKind, ActivityLog};
use crate::candidates::{CandidateStore, MediaCandidate, MediaObservation, UNKNOWN_TAB_ID};
use crate::config::ConfigStore;
use crate::media;
use crate::storage::StorageError;
use crate::text::Clock;

/// One response header as reported by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpHeader {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// A headers-received event for any network response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadersReceivedEvent {
    pub url: String,
    #[serde(default)]
    pub response_headers: Vec<HttpHeader>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub initiator: Option<String>,
    #[serde(default = "unknown_tab")]
    pub tab_id: i64,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub method: String,
}

fn unknown_tab() -> i64 {
    UNKNOWN_TAB_ID
}

impl HeadersReceivedEvent {
    /// Value of the `Content-Type` header, matched case-insensitively.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.response_headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case("content-type"))
            .and_then(|header| header.value.as_deref())
            .unwrap_or_default()
    }

    /// Page that triggered the request: document URL, else initiator.
    #[must_use]
    pub fn page_url(&self) -> &str {
        self.document_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.initiator.as_deref())
            .unwrap_or_default()
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Feeds media-looking responses into the candidate catalog.
#[derive(Clone)]
pub(crate) struct MediaSniffer {
    config: ConfigStore,
    candidates: CandidateStore,
    activity: ActivityLog,
    clock: Clock,
}

impl fmt::Debug for MediaSniffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaSniffer").finish_non_exhaustive()
    }
}

impl MediaSniffer {
    pub(crate) fn new(
        config: ConfigStore,
        candidates: CandidateStore,
        activity: ActivityLog,
        clock: Clock,
    ) -> Self {
        Self {
            config,
            candidates,
            activity,
            clock,
        }
    }

    /// Records the response if it looks like media. Storage failures are
    /// logged and written to the error slot, never returned.
    pub(crate) async fn on_headers_received(
        &self,
        event: &HeadersReceivedEvent,
    ) -> Option<MediaCandidate> {
        match self.capture(event).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(url = %event.url, error = %err, "media capture failed");
                let message = format!("media capture failed: {err}");
                if let Err(record_err) = self
                    .activity
                    .record(ActivityKind::Error, &message, (self.clock)())
                    .await
                {
                    warn!(error = %record_err, "failed to record media capture error");
                }
                None
            }
        }
    }

    async fn capture(
        &self,
        event: &HeadersReceivedEvent,
    ) -> Result<Option<MediaCandidate>, StorageError> {
        let url = event.url.trim();
        if url.is_empty() || !is_http_url(url) {
            return Ok(None);
        }
        let config = self.config.get().await?;
        if !config.sniff_media_enabled {
            return Ok(None);
        }
        let content_type = event.content_type();
        let Some(reason) = media::detect(url, content_type) else {
            trace!(url, content_type, "not media");
            return Ok(None);
        };

        let observation = MediaObservation {
            url: url.to_string(),
            page_url: event.page_url().to_string(),
            tab_id: event.tab_id,
            content_type: content_type.to_string(),
            reason,
            status_code: event.status_code,
            method: event.method.clone(),
            seen_at: (self.clock)(),
        };
        let stored = self.candidates.upsert(observation).await?;
        debug!(url, %reason, "media candidate captured");
        Ok(stored)
    }
}
