//! Forwarding add requests from the host to the HTTP bridge.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use super::config::HostConfig;
use crate::bridge::{BridgeRequest, TOKEN_HEADER, TransportError};
use crate::text::truncate_chars;
use crate::user_agent;

/// Per-request timeout for host-to-bridge calls.
pub const HOST_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Cap on echoed response bodies.
pub const MAX_DETAIL_CHARS: usize = 500;

/// Posts messages to the bridge and turns every result into a reply object.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    config: HostConfig,
}

impl Forwarder {
    /// # Errors
    ///
    /// Returns [`TransportError::Channel`] if the HTTP client cannot be built.
    pub fn new(config: HostConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent::default_bridge_user_agent())
            .timeout(HOST_REQUEST_TIMEOUT)
            .build()
            .map_err(|err| TransportError::channel(&format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    /// Sends `{url, save_dir?}` taken from `message`. Never fails; problems
    /// come back as `{ok: false, error}`.
    #[instrument(skip(self, message))]
    pub async fn forward(&self, message: &Value) -> Value {
        let url = message
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();
        if url.is_empty() {
            return json!({ "ok": false, "error": "url is required" });
        }
        let token = self.config.token.trim();
        if token.is_empty() {
            return json!({ "ok": false, "error": "bridge token missing in native-host config" });
        }
        let save_dir = message.get("save_dir").and_then(Value::as_str);
        let body = BridgeRequest::new(url, save_dir);

        let response = match self
            .client
            .post(self.config.endpoint.trim())
            .header(TOKEN_HEADER, token)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(url, error = %err, "bridge unreachable");
                return json!({ "ok": false, "error": format!("bridge request failed: {err}") });
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                return json!({ "ok": false, "error": format!("bridge request failed: {err}") });
            }
        };
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "bridge rejected request");
            return json!({
                "ok": false,
                "error": format!("bridge request failed: {}", status.as_u16()),
                "detail": truncate_chars(&text, MAX_DETAIL_CHARS),
            });
        }
        info!(url, status = status.as_u16(), "forwarded to bridge");
        if text.trim().is_empty() {
            return json!({});
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => json!({ "ok": true }),
            Err(_) => json!({
                "ok": status.as_u16() < 400,
                "status": status.as_u16(),
                "raw": truncate_chars(&text, MAX_DETAIL_CHARS),
            }),
        }
    }
}
