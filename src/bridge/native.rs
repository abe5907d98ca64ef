//! Native-messaging transport.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::codec::{read_frame, write_message};
use super::manifest::resolve_host;
use super::{BridgeRequest, DispatchOutcome, Transport, TransportError};

/// Origin passed to the host as its first argument, as browsers do.
pub const DEFAULT_CALLER_ORIGIN: &str = "chrome-extension://flamingo-bridge/";

/// One request/response exchange with a named native host.
#[async_trait]
pub trait NativePort: Send + Sync {
    /// Sends `message` to `host` and returns its reply, whatever JSON it is.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the host cannot be reached or replies
    /// with a malformed frame.
    async fn exchange(&self, host: &str, message: &Value) -> Result<Value, TransportError>;
}

/// [`NativePort`] that launches the host executable for every message.
///
/// The child inherits this process's environment plus any variables added
/// with [`ProcessPort::with_env`].
#[derive(Debug, Clone)]
pub struct ProcessPort {
    origin: String,
    envs: Vec<(String, String)>,
}

impl Default for ProcessPort {
    fn default() -> Self {
        Self::new(DEFAULT_CALLER_ORIGIN)
    }
}

impl ProcessPort {
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            envs: Vec::new(),
        }
    }

    /// Sets `key` to `value` in every launched host's environment.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl NativePort for ProcessPort {
    #[instrument(skip(self, message))]
    async fn exchange(&self, host: &str, message: &Value) -> Result<Value, TransportError> {
        let exe = resolve_host(host).await?;
        let mut child = Command::new(&exe)
            .arg(&self.origin)
            .envs(self.envs.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                TransportError::channel(&format!("failed to start {}: {err}", exe.display()))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::channel("native host stdin unavailable"))?;
        write_message(&mut stdin, message)
            .await
            .map_err(|err| TransportError::channel(&err.to_string()))?;
        drop(stdin);

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::channel("native host stdout unavailable"))?;
        let reply = read_frame(&mut stdout)
            .await
            .map_err(|err| TransportError::channel(&err.to_string()))?
            .ok_or_else(|| TransportError::channel("native host exited without replying"))?;

        match child.wait().await {
            Ok(status) if !status.success() => {
                warn!(%status, "native host exited with failure after replying");
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "failed to reap native host"),
        }
        Ok(reply)
    }
}

/// Transport over a native-messaging host.
#[derive(Clone)]
pub struct NativeMessagingTransport {
    host: String,
    port: Arc<dyn NativePort>,
}

impl std::fmt::Debug for NativeMessagingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeMessagingTransport")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl NativeMessagingTransport {
    #[must_use]
    pub fn new(host: impl Into<String>, port: Arc<dyn NativePort>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    async fn exchange(&self, message: &Value) -> Result<DispatchOutcome, TransportError> {
        let reply = self
            .port
            .exchange(&self.host, message)
            .await
            .map_err(|err| match err {
                channel @ TransportError::Channel { .. } => channel,
                other => TransportError::channel(&other.to_string()),
            })?;
        Ok(DispatchOutcome::from_response(reply))
    }
}

#[async_trait]
impl Transport for NativeMessagingTransport {
    fn name(&self) -> &'static str {
        "native"
    }

    #[instrument(skip(self, request), fields(host = %self.host, url = %request.url))]
    async fn send(&self, request: &BridgeRequest) -> Result<DispatchOutcome, TransportError> {
        let message = serde_json::to_value(request)
            .map_err(|err| TransportError::channel(&err.to_string()))?;
        let outcome = self.exchange(&message).await?;
        debug!(ok = outcome.is_ok(), task_id = ?outcome.task_id(), "native host responded");
        Ok(outcome)
    }

    async fn ping(&self) -> Result<DispatchOutcome, TransportError> {
        self.exchange(&json!({"action": "ping"})).await
    }
}
