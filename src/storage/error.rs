//! Error types for key/value persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`KeyValueStore`](super::KeyValueStore) backends and the
/// components that serialize values into them.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error reading or replacing a store file.
    #[error("IO error accessing {path}: {source}")]
    Io {
        /// The store file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but does not hold a JSON object.
    #[error("corrupt store file {path}: {detail}")]
    Corrupt {
        /// The store file involved.
        path: PathBuf,
        /// What was wrong with its content.
        detail: String,
    },

    /// A value could not be converted to or from its JSON form.
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        /// The key being written or read.
        key: String,
        /// The serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The serialized writer task has shut down.
    #[error("storage worker is no longer running")]
    WorkerStopped,
}

impl StorageError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a corrupt-file error.
    pub fn corrupt(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Creates an encoding error.
    pub fn encode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encode {
            key: key.into(),
            source,
        }
    }
}
