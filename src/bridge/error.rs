//! Error types for bridge transports.

use std::path::PathBuf;

use thiserror::Error;

use crate::text::truncate_message;

/// Failures raised by a [`Transport`](super::Transport).
///
/// Policy-level refusals (bridge disabled, missing token) are *not* errors;
/// they come back as skipped [`DispatchOutcome`](super::DispatchOutcome)s.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The bridge answered with a non-2xx status.
    #[error("bridge request failed: {status} {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The request never produced a response (DNS, connect, TLS, read).
    #[error("bridge request to {endpoint} failed: {source}")]
    Network {
        /// Endpoint that was contacted.
        endpoint: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured endpoint is not a usable URL.
    #[error("invalid bridge endpoint: {endpoint}")]
    InvalidEndpoint {
        /// The offending endpoint.
        endpoint: String,
    },

    /// A 2xx response whose body was not JSON.
    #[error("bridge returned invalid response: {detail}")]
    InvalidResponse {
        /// Parse failure, truncated.
        detail: String,
    },

    /// The native-messaging exchange failed (spawn, pipe, framing).
    #[error("native messaging failed: {message}")]
    Channel {
        /// Failure description, truncated.
        message: String,
    },

    /// No manifest or executable could be found for the native host.
    #[error("native host {host} not found (searched {searched:?})")]
    HostNotFound {
        /// Host name from config.
        host: String,
        /// Manifest directories that were checked.
        searched: Vec<PathBuf>,
    },
}

impl TransportError {
    /// Creates a status error, truncating the body.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self::HttpStatus {
            status,
            body: truncate_message(body),
        }
    }

    /// Creates a network error.
    pub fn network(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Creates an invalid-endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
        }
    }

    /// Creates an invalid-response error, truncating the detail.
    pub fn invalid_response(detail: &str) -> Self {
        Self::InvalidResponse {
            detail: truncate_message(detail),
        }
    }

    /// Creates a channel error, truncating the message.
    pub fn channel(message: &str) -> Self {
        Self::Channel {
            message: truncate_message(message),
        }
    }

    /// Creates a host-not-found error.
    pub fn host_not_found(host: impl Into<String>, searched: Vec<PathBuf>) -> Self {
        Self::HostNotFound {
            host: host.into(),
            searched,
        }
    }
}
