//! Errors that abort an interception decision.

use thiserror::Error;

use crate::bridge::TransportError;
use crate::storage::StorageError;

/// Unexpected failures while deciding on a download.
///
/// These never escape the engine: they are logged and recorded as the
/// event's error outcome, and the browser download is left alone.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
