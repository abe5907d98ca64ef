//! HTTP transport: `POST <endpoint>` with an `X-Token` header.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{BridgeRequest, DispatchOutcome, Transport, TransportError};
use crate::user_agent;

/// Header carrying the bridge token.
pub const TOKEN_HEADER: &str = "X-Token";

/// Builds the shared HTTP client for bridge traffic.
///
/// No request timeout is set; a dispatch runs until the bridge answers or the
/// connection fails.
///
/// # Errors
///
/// Returns [`TransportError::Channel`] if the client cannot be constructed.
pub fn build_http_client() -> Result<Client, TransportError> {
    Client::builder()
        .user_agent(user_agent::default_bridge_user_agent())
        .build()
        .map_err(|err| TransportError::channel(&format!("failed to build HTTP client: {err}")))
}

/// Transport to the desktop app's HTTP bridge.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpTransport {
    /// Creates a transport over a shared client.
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// The `/health` URL on the endpoint's origin.
    fn health_url(&self) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|_| TransportError::invalid_endpoint(&self.endpoint))?;
        url.set_path("/health");
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    async fn read_outcome(
        &self,
        response: reqwest::Response,
    ) -> Result<DispatchOutcome, TransportError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::network(&self.endpoint, err))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "bridge rejected request");
            return Err(TransportError::http_status(status.as_u16(), &body));
        }
        let value: Value = serde_json::from_str(&body)
            .map_err(|err| TransportError::invalid_response(&err.to_string()))?;
        Ok(DispatchOutcome::from_response(value))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, url = %request.url))]
    async fn send(&self, request: &BridgeRequest) -> Result<DispatchOutcome, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(TOKEN_HEADER, &self.token)
            .json(request)
            .send()
            .await
            .map_err(|err| TransportError::network(&self.endpoint, err))?;
        let outcome = self.read_outcome(response).await?;
        debug!(ok = outcome.is_ok(), task_id = ?outcome.task_id(), "bridge responded");
        Ok(outcome)
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn ping(&self) -> Result<DispatchOutcome, TransportError> {
        let url = self.health_url()?;
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|err| TransportError::network(&self.endpoint, err))?;
        self.read_outcome(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn transport(endpoint: &str) -> HttpTransport {
        HttpTransport::new(build_http_client().unwrap(), endpoint, "tok")
    }

    #[test]
    fn test_health_url_replaces_path_and_query() {
        let url = transport("http://127.0.0.1:16789/add?x=1").health_url().unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:16789/health");
    }

    #[test]
    fn test_health_url_rejects_garbage_endpoint() {
        let err = transport("not a url").health_url().unwrap_err();
        assert!(matches!(err, TransportError::InvalidEndpoint { .. }));
    }
}
