//! Transport selection and prerequisite checks.

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, instrument};

use super::http::{HttpTransport, build_http_client};
use super::native::{NativeMessagingTransport, NativePort, ProcessPort};
use super::{BridgeRequest, DispatchOutcome, Transport, TransportError};
use crate::config::Config;

/// Skip reason: the bridge master switch is off.
pub const REASON_BRIDGE_DISABLED: &str = "bridge_disabled";
/// Skip reason: native messaging selected without a host.
pub const REASON_NATIVE_HOST_MISSING: &str = "native_host_missing";
/// Skip reason: HTTP transport selected without a token.
pub const REASON_TOKEN_MISSING: &str = "bridge_token_missing";

/// Sends accepted URLs to the download manager.
///
/// Holds the long-lived resources (HTTP connection pool, native port) and
/// builds the right [`Transport`] from the config passed to each call, so a
/// settings change takes effect on the next dispatch.
#[derive(Clone)]
pub struct DispatchBridge {
    http: Client,
    native: Arc<dyn NativePort>,
}

impl std::fmt::Debug for DispatchBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchBridge").finish_non_exhaustive()
    }
}

enum Route {
    Skip(&'static str),
    Deliver(Box<dyn Transport>),
}

impl DispatchBridge {
    /// Creates a bridge that launches native hosts as child processes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self::with_parts(
            build_http_client()?,
            Arc::new(ProcessPort::default()),
        ))
    }

    /// Creates a bridge from explicit parts.
    #[must_use]
    pub fn with_parts(http: Client, native: Arc<dyn NativePort>) -> Self {
        Self { http, native }
    }

    fn route(&self, config: &Config) -> Route {
        if !config.enabled {
            return Route::Skip(REASON_BRIDGE_DISABLED);
        }
        if config.use_native_messaging {
            let host = config.native_host.trim();
            if host.is_empty() {
                return Route::Skip(REASON_NATIVE_HOST_MISSING);
            }
            return Route::Deliver(Box::new(NativeMessagingTransport::new(
                host,
                Arc::clone(&self.native),
            )));
        }
        let token = config.token.trim();
        if token.is_empty() {
            return Route::Skip(REASON_TOKEN_MISSING);
        }
        Route::Deliver(Box::new(HttpTransport::new(
            self.http.clone(),
            config.endpoint.trim(),
            token,
        )))
    }

    /// Submits `url` through the configured transport.
    ///
    /// Missing prerequisites yield a skipped outcome and no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the chosen channel fails.
    #[instrument(skip(self, config), fields(native = config.use_native_messaging))]
    pub async fn send(
        &self,
        config: &Config,
        url: &str,
        save_dir: Option<&str>,
    ) -> Result<DispatchOutcome, TransportError> {
        let transport = match self.route(config) {
            Route::Skip(reason) => {
                debug!(reason, "dispatch skipped");
                return Ok(DispatchOutcome::skipped(reason));
            }
            Route::Deliver(transport) => transport,
        };
        let request = BridgeRequest::new(url.trim(), save_dir);
        let outcome = transport.send(&request).await?;
        info!(
            transport = transport.name(),
            ok = outcome.is_ok(),
            task_id = ?outcome.task_id(),
            "dispatched to bridge"
        );
        Ok(outcome)
    }

    /// Pings the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the chosen channel fails.
    pub async fn ping(&self, config: &Config) -> Result<DispatchOutcome, TransportError> {
        match self.route(config) {
            Route::Skip(reason) => Ok(DispatchOutcome::skipped(reason)),
            Route::Deliver(transport) => transport.ping().await,
        }
    }
}
