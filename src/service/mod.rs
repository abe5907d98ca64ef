//! Entry points the browser host calls into.
//!
//! [`BridgeService`] owns one instance of every component and exposes the
//! four event listeners plus the UI message router:
//!
//! - [`BridgeService::on_installed`]
//! - [`BridgeService::on_download_created`]
//! - [`BridgeService::on_headers_received`]
//! - [`BridgeService::on_context_menu_clicked`]
//! - [`BridgeService::handle`] / [`BridgeService::handle_message`]
//!
//! None of them return errors; failures end up in the activity log or in a
//! `{ok: false, error}` response.

mod context_menu;
mod messages;
mod sniff;

pub use context_menu::{ContextMenuClick, MENU_DOWNLOAD_LINK, MENU_DOWNLOAD_PAGE, MENU_ITEMS, MenuItem};
pub use messages::{QuickFlags, QuickState, Request, Response};
pub use sniff::{HeadersReceivedEvent, HttpHeader};

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::activity::{ActivityKind, ActivityLog};
use crate::bridge::{DispatchBridge, DispatchOutcome};
use crate::candidates::{CandidateStore, MediaCandidate};
use crate::config::{Config, ConfigPatch, ConfigStore};
use crate::intercept::{DownloadEvent, DownloadsApi, InterceptOutcome, InterceptionEngine};
use crate::storage::{KeyValueStore, StorageError};
use crate::text::{Clock, truncate_message};
use sniff::MediaSniffer;

/// The assembled core.
#[derive(Clone)]
pub struct BridgeService {
    config: ConfigStore,
    candidates: CandidateStore,
    activity: ActivityLog,
    bridge: DispatchBridge,
    engine: InterceptionEngine,
    sniffer: MediaSniffer,
    clock: Clock,
}

impl fmt::Debug for BridgeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeService").finish_non_exhaustive()
    }
}

impl BridgeService {
    /// Wires the components over the two storage namespaces.
    ///
    /// Spawns the candidate writer task, so this must run inside a Tokio
    /// runtime.
    #[must_use]
    pub fn new(
        sync: Arc<dyn KeyValueStore>,
        local: Arc<dyn KeyValueStore>,
        bridge: DispatchBridge,
        downloads: Arc<dyn DownloadsApi>,
        clock: Clock,
    ) -> Self {
        let config = ConfigStore::new(sync);
        let candidates = CandidateStore::spawn(Arc::clone(&local));
        let activity = ActivityLog::new(local);
        let engine = InterceptionEngine::new(
            config.clone(),
            bridge.clone(),
            downloads,
            activity.clone(),
            Arc::clone(&clock),
        );
        let sniffer = MediaSniffer::new(
            config.clone(),
            candidates.clone(),
            activity.clone(),
            Arc::clone(&clock),
        );
        Self {
            config,
            candidates,
            activity,
            bridge,
            engine,
            sniffer,
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    #[must_use]
    pub fn candidates(&self) -> &CandidateStore {
        &self.candidates
    }

    #[must_use]
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Completes the stored config and returns the menu entries to register.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the settings namespace is unavailable.
    pub async fn on_installed(&self) -> Result<&'static [MenuItem], StorageError> {
        let config = self.config.ensure_defaults().await?;
        info!(
            enabled = config.enabled,
            native = config.use_native_messaging,
            "installed with defaults"
        );
        Ok(&MENU_ITEMS)
    }

    pub async fn on_download_created(&self, event: &DownloadEvent) -> InterceptOutcome {
        self.engine.on_download_created(event).await
    }

    pub async fn on_headers_received(&self, event: &HeadersReceivedEvent) -> Option<MediaCandidate> {
        self.sniffer.on_headers_received(event).await
    }

    /// Sends the clicked link or page. Clicks on foreign menu ids, or without
    /// a URL, are ignored and return `None`.
    #[instrument(skip(self, click), fields(menu = %click.menu_item_id))]
    pub async fn on_context_menu_clicked(&self, click: &ContextMenuClick) -> Option<Response> {
        let Some(url) = click.target_url() else {
            debug!("context menu click ignored");
            return None;
        };
        Some(self.dispatch_and_record(url, None).await)
    }

    /// Parses a raw message and routes it. Always answers with an object.
    pub async fn handle_message(&self, raw: Value) -> Value {
        let response = match serde_json::from_value::<Request>(raw) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                debug!(error = %err, "rejected message");
                Response::failure(format!("invalid request: {err}"))
            }
        };
        serde_json::to_value(&response).unwrap_or_else(|err| {
            serde_json::json!({ "ok": false, "error": err.to_string() })
        })
    }

    /// Routes one typed request.
    pub async fn handle(&self, request: Request) -> Response {
        let result = match request {
            Request::ListMediaCandidates => {
                self.candidates.list().await.map(Response::candidates)
            }
            Request::ClearMediaCandidates => self.candidates.clear().await.map(|()| Response::ack()),
            Request::SendMediaCandidate { url, save_dir } => {
                return self.dispatch_and_record(&url, save_dir.as_deref()).await;
            }
            Request::GetQuickState => self.quick_state().await.map(Response::state),
            Request::SetQuickFlags(flags) => self
                .config
                .set(&ConfigPatch::from(flags))
                .await
                .map(|()| Response::ack()),
            Request::PingBridge => return self.ping().await,
        };
        result.unwrap_or_else(|err| {
            warn!(error = %err, "message handler failed");
            Response::failure(truncate_message(&err.to_string()))
        })
    }

    /// Current flags, catalog size and activity slots.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either namespace cannot be read.
    pub async fn quick_state(&self) -> Result<QuickState, StorageError> {
        let config = self.config.get().await?;
        let media_count = self.candidates.list().await?.len();
        let activity = self.activity.snapshot().await?;
        Ok(QuickState {
            enabled: config.enabled,
            sniff_media_enabled: config.sniff_media_enabled,
            auto_intercept: config.auto_intercept,
            media_count,
            last_bridge_error: activity.last_bridge_error,
            last_bridge_success: activity.last_bridge_success,
            last_bridge_skip: activity.last_bridge_skip,
            last_bridge_activity_at: activity.last_bridge_activity_at,
        })
    }

    async fn ping(&self) -> Response {
        let outcome = match self.config.get().await {
            Ok(config) => self.bridge.ping(&config).await.map_err(|e| e.to_string()),
            Err(err) => Err(err.to_string()),
        };
        match outcome {
            Ok(outcome) => Response::Dispatch(outcome),
            Err(message) => {
                warn!(error = %message, "bridge ping failed");
                Response::failure(truncate_message(&message))
            }
        }
    }

    /// Sends a user-chosen URL, bypassing the auto-intercept policy, and
    /// records the result.
    async fn dispatch_and_record(&self, url: &str, save_dir: Option<&str>) -> Response {
        let url = url.trim();
        if url.is_empty() {
            return Response::failure("url is required");
        }
        let result = match self.config.get().await {
            Ok(config) => self.send_with(&config, url, save_dir).await,
            Err(err) => Err(err.to_string()),
        };
        let (kind, message, response) = match result {
            Ok(outcome) if outcome.is_ok() => {
                info!(url, task_id = ?outcome.task_id(), "sent to bridge");
                (ActivityKind::Success, format!("sent {url}"), Response::Dispatch(outcome))
            }
            Ok(outcome) => {
                let reason = outcome.refusal_reason();
                info!(url, %reason, "bridge declined");
                (ActivityKind::Skip, format!("{reason} ({url})"), Response::Dispatch(outcome))
            }
            Err(message) => {
                error!(url, error = %message, "send to bridge failed");
                let message = truncate_message(&message);
                (ActivityKind::Error, message.clone(), Response::failure(message))
            }
        };
        if let Err(err) = self.activity.record(kind, &message, (self.clock)()).await {
            warn!(error = %err, "failed to record send activity");
        }
        response
    }

    async fn send_with(
        &self,
        config: &Config,
        url: &str,
        save_dir: Option<&str>,
    ) -> Result<DispatchOutcome, String> {
        self.bridge
            .send(config, url, save_dir)
            .await
            .map_err(|err| err.to_string())
    }
}
