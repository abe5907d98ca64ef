//! Last-outcome diagnostics for bridge dispatch.
//!
//! Four independent slots live in the local storage namespace: the last
//! success, skip, and error messages, plus the time of the latest event of
//! any kind. Each event overwrites its own slot; there is no history.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::storage::{KeyValueStore, Record, StorageError};
use crate::text::truncate_message;

const KEY_SUCCESS: &str = "lastBridgeSuccess";
const KEY_SKIP: &str = "lastBridgeSkip";
const KEY_ERROR: &str = "lastBridgeError";
const KEY_ACTIVITY_AT: &str = "lastBridgeActivityAt";

const ACTIVITY_KEYS: [&str; 4] = [KEY_SUCCESS, KEY_SKIP, KEY_ERROR, KEY_ACTIVITY_AT];

/// Outcome category of a bridge event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Success,
    Skip,
    Error,
}

impl ActivityKind {
    fn slot(self) -> &'static str {
        match self {
            Self::Success => KEY_SUCCESS,
            Self::Skip => KEY_SKIP,
            Self::Error => KEY_ERROR,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Skip => "skip",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Snapshot of the activity slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub last_bridge_success: Option<String>,
    pub last_bridge_skip: Option<String>,
    pub last_bridge_error: Option<String>,
    /// Epoch milliseconds of the latest recorded event.
    pub last_bridge_activity_at: Option<i64>,
}

/// Recorder over the local namespace.
#[derive(Clone)]
pub struct ActivityLog {
    local: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityLog").finish_non_exhaustive()
    }
}

impl ActivityLog {
    #[must_use]
    pub fn new(local: Arc<dyn KeyValueStore>) -> Self {
        Self { local }
    }

    /// Overwrites the slot for `kind` and the activity timestamp in one write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the local namespace cannot be written.
    pub async fn record(
        &self,
        kind: ActivityKind,
        message: &str,
        at: i64,
    ) -> Result<(), StorageError> {
        let message = truncate_message(message);
        debug!(%kind, message = %message, "bridge activity");
        let mut patch = Record::new();
        patch.insert(kind.slot().to_string(), Value::String(message));
        patch.insert(KEY_ACTIVITY_AT.to_string(), Value::from(at));
        self.local.set(patch).await
    }

    /// Reads all slots.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the local namespace cannot be read.
    pub async fn snapshot(&self) -> Result<ActivityRecord, StorageError> {
        let record = self.local.get(&ACTIVITY_KEYS).await?;
        let text = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Ok(ActivityRecord {
            last_bridge_success: text(KEY_SUCCESS),
            last_bridge_skip: text(KEY_SKIP),
            last_bridge_error: text(KEY_ERROR),
            last_bridge_activity_at: record.get(KEY_ACTIVITY_AT).and_then(Value::as_i64),
        })
    }
}
