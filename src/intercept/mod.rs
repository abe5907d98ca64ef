//! Takeover of browser-native downloads.
//!
//! For every download-creation event the [`InterceptionEngine`] walks a fixed
//! decision chain (bridge enabled, auto-intercept on, URL present, supported
//! scheme, allow-listed host) and hands accepted URLs to the
//! [`DispatchBridge`](crate::bridge::DispatchBridge). Each event ends in
//! exactly one [`InterceptOutcome`], which is also written to the
//! [`ActivityLog`](crate::activity::ActivityLog).

mod downloads;
mod engine;
mod error;

pub use downloads::{BrowserError, DownloadsApi, LoggingDownloads};
pub use engine::{DownloadEvent, InterceptOutcome, InterceptionEngine, SkipReason};
pub use error::InterceptError;
