//! Browser download-list capability.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// A browser API call that failed.
#[derive(Debug, Error)]
#[error("browser call failed: {message}")]
pub struct BrowserError {
    pub message: String,
}

impl BrowserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Operations on the browser's own download list.
///
/// Both calls are advisory from the engine's point of view: once the bridge
/// has accepted a task, failures here are logged and dropped.
#[async_trait]
pub trait DownloadsApi: Send + Sync {
    /// Cancels an in-progress browser download.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] if the browser refuses.
    async fn cancel(&self, id: i64) -> Result<(), BrowserError>;

    /// Removes a download from the browser's history.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] if the browser refuses.
    async fn erase(&self, id: i64) -> Result<(), BrowserError>;
}

/// [`DownloadsApi`] with no browser behind it; records the calls in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDownloads;

#[async_trait]
impl DownloadsApi for LoggingDownloads {
    async fn cancel(&self, id: i64) -> Result<(), BrowserError> {
        info!(id, "would cancel browser download");
        Ok(())
    }

    async fn erase(&self, id: i64) -> Result<(), BrowserError> {
        info!(id, "would erase browser download");
        Ok(())
    }
}
