//! Download interception state machine.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::downloads::DownloadsApi;
use super::error::InterceptError;
use crate::activity::{ActivityKind, ActivityLog};
use crate::allowlist;
use crate::bridge::DispatchBridge;
use crate::config::ConfigStore;
use crate::text::{Clock, truncate_message};

/// A browser download-creation event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DownloadEvent {
    pub id: i64,
    #[serde(default)]
    pub url: Option<String>,
}

impl DownloadEvent {
    #[must_use]
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: Some(url.into()),
        }
    }
}

/// Why a download was left to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    BridgeDisabled,
    AutoInterceptDisabled,
    MissingUrl,
    UnsupportedScheme,
    HostNotAllowed,
    /// The bridge declined; carries its own reason or error text.
    Bridge(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BridgeDisabled => f.write_str("bridge disabled"),
            Self::AutoInterceptDisabled => f.write_str("auto intercept disabled"),
            Self::MissingUrl => f.write_str("missing download url"),
            Self::UnsupportedScheme => f.write_str("unsupported scheme"),
            Self::HostNotAllowed => f.write_str("host not in allowlist"),
            Self::Bridge(reason) => f.write_str(reason),
        }
    }
}

/// Terminal state of one download event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptOutcome {
    /// The bridge accepted the download; the browser copy was cancelled.
    Success { task_id: Option<String> },
    /// Policy or the bridge declined; the browser download proceeds.
    Skipped(SkipReason),
    /// Something failed; the browser download proceeds.
    Failed(String),
}

impl InterceptOutcome {
    fn activity_kind(&self) -> ActivityKind {
        match self {
            Self::Success { .. } => ActivityKind::Success,
            Self::Skipped(_) => ActivityKind::Skip,
            Self::Failed(_) => ActivityKind::Error,
        }
    }

    fn describe(&self, url: &str) -> String {
        let suffix = if url.is_empty() {
            String::new()
        } else {
            format!(" ({url})")
        };
        match self {
            Self::Success {
                task_id: Some(task_id),
            } => format!("intercepted as task {task_id}{suffix}"),
            Self::Success { task_id: None } => format!("intercepted{suffix}"),
            Self::Skipped(reason) => format!("{reason}{suffix}"),
            Self::Failed(message) => message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Http,
    Magnet,
}

fn classify_scheme(url: &str) -> Option<Scheme> {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(Scheme::Http)
    } else if lower.starts_with("magnet:?") {
        Some(Scheme::Magnet)
    } else {
        None
    }
}

/// Decides, for each browser download, whether the bridge takes it over.
#[derive(Clone)]
pub struct InterceptionEngine {
    config: ConfigStore,
    bridge: DispatchBridge,
    downloads: Arc<dyn DownloadsApi>,
    activity: ActivityLog,
    clock: Clock,
}

impl fmt::Debug for InterceptionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionEngine").finish_non_exhaustive()
    }
}

impl InterceptionEngine {
    #[must_use]
    pub fn new(
        config: ConfigStore,
        bridge: DispatchBridge,
        downloads: Arc<dyn DownloadsApi>,
        activity: ActivityLog,
        clock: Clock,
    ) -> Self {
        Self {
            config,
            bridge,
            downloads,
            activity,
            clock,
        }
    }

    /// Handles one download-creation event to completion.
    ///
    /// Never fails: every path ends in an [`InterceptOutcome`] that is also
    /// recorded in the activity log.
    #[instrument(skip(self, event), fields(id = event.id))]
    pub async fn on_download_created(&self, event: &DownloadEvent) -> InterceptOutcome {
        let url = event.url.as_deref().map(str::trim).unwrap_or_default();
        let outcome = match self.decide(event.id, url).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, url, "download takeover failed");
                InterceptOutcome::Failed(truncate_message(&err.to_string()))
            }
        };
        match &outcome {
            InterceptOutcome::Success { task_id } => info!(url, ?task_id, "download intercepted"),
            InterceptOutcome::Skipped(reason) => info!(url, %reason, "download left to browser"),
            InterceptOutcome::Failed(_) => {}
        }
        let at = (self.clock)();
        if let Err(err) = self
            .activity
            .record(outcome.activity_kind(), &outcome.describe(url), at)
            .await
        {
            warn!(error = %err, "failed to record interception activity");
        }
        outcome
    }

    async fn decide(&self, id: i64, url: &str) -> Result<InterceptOutcome, InterceptError> {
        let config = self.config.get().await?;
        if !config.enabled {
            return Ok(InterceptOutcome::Skipped(SkipReason::BridgeDisabled));
        }
        if !config.auto_intercept {
            return Ok(InterceptOutcome::Skipped(SkipReason::AutoInterceptDisabled));
        }
        if url.is_empty() {
            return Ok(InterceptOutcome::Skipped(SkipReason::MissingUrl));
        }
        let Some(scheme) = classify_scheme(url) else {
            return Ok(InterceptOutcome::Skipped(SkipReason::UnsupportedScheme));
        };
        if scheme == Scheme::Http {
            let rules = allowlist::parse(&config.intercept_allowlist);
            if !allowlist::is_allowed(url, &rules) {
                return Ok(InterceptOutcome::Skipped(SkipReason::HostNotAllowed));
            }
        }

        let result = self.bridge.send(&config, url, None).await?;
        if !result.is_ok() {
            return Ok(InterceptOutcome::Skipped(SkipReason::Bridge(
                result.refusal_reason(),
            )));
        }

        self.release_browser_download(id).await;
        Ok(InterceptOutcome::Success {
            task_id: result.task_id().map(str::to_string),
        })
    }

    /// Cancels and erases the browser's copy. Failures are logged only: the
    /// bridge already owns the download.
    async fn release_browser_download(&self, id: i64) {
        if let Err(err) = self.downloads.cancel(id).await {
            warn!(id, error = %err, "cancel of intercepted download failed");
        }
        if let Err(err) = self.downloads.erase(id).await {
            warn!(id, error = %err, "erase of intercepted download failed");
        }
    }
}
