//! Dispatch of accepted URLs to the external download manager.
//!
//! Two channels reach the desktop app, both behind the [`Transport`] trait:
//! - [`HttpTransport`] - `POST` to the bridge endpoint with an `X-Token` header
//! - [`NativeMessagingTransport`] - one framed JSON exchange with a native host
//!
//! [`DispatchBridge`] picks the channel from [`Config`](crate::Config), turns
//! missing prerequisites into skipped outcomes without any I/O, and
//! normalizes every response into a [`DispatchOutcome`].
//!
//! # Example
//!
//! ```no_run
//! use flamingo_bridge::Config;
//! use flamingo_bridge::bridge::DispatchBridge;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bridge = DispatchBridge::new()?;
//! let config = Config { enabled: true, token: "secret".into(), ..Config::default() };
//! let outcome = bridge.send(&config, "https://example.com/file.zip", None).await?;
//! println!("accepted: {}", outcome.is_ok());
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod dispatch;
mod error;
mod http;
pub mod manifest;
mod native;
mod outcome;

pub use dispatch::{
    DispatchBridge, REASON_BRIDGE_DISABLED, REASON_NATIVE_HOST_MISSING, REASON_TOKEN_MISSING,
};
pub use error::TransportError;
pub use http::{HttpTransport, TOKEN_HEADER, build_http_client};
pub use native::{DEFAULT_CALLER_ORIGIN, NativeMessagingTransport, NativePort, ProcessPort};
pub use outcome::DispatchOutcome;

use async_trait::async_trait;
use serde::Serialize;

/// Body sent to the bridge on either channel: `{url, save_dir?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<String>,
}

impl BridgeRequest {
    /// Builds a request, dropping a blank `save_dir`.
    #[must_use]
    pub fn new(url: impl Into<String>, save_dir: Option<&str>) -> Self {
        Self {
            url: url.into(),
            save_dir: save_dir
                .map(str::trim)
                .filter(|dir| !dir.is_empty())
                .map(str::to_string),
        }
    }
}

/// A channel to the download manager.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Submits one download.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the channel rejects the request.
    async fn send(&self, request: &BridgeRequest) -> Result<DispatchOutcome, TransportError>;

    /// Checks that the bridge is reachable and accepts our credentials.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the channel rejects the ping.
    async fn ping(&self) -> Result<DispatchOutcome, TransportError>;
}
