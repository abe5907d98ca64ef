//! Normalized bridge result.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Result of one dispatch, on either transport.
///
/// Serializes to exactly the object the bridge sent. The accessors read a
/// normalized view of it for callers that only need the decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    ok: bool,
    skipped: bool,
    reason: Option<String>,
    task_id: Option<String>,
    error: Option<String>,
    raw: Map<String, Value>,
}

impl Serialize for DispatchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl DispatchOutcome {
    /// A bare `{ok: true}`.
    #[must_use]
    pub fn accepted() -> Self {
        let mut raw = Map::new();
        raw.insert("ok".into(), Value::Bool(true));
        Self::from_map(raw)
    }

    /// `{ok: false, skipped: true, reason}`; no I/O was attempted.
    #[must_use]
    pub fn skipped(reason: &str) -> Self {
        let mut raw = Map::new();
        raw.insert("ok".into(), Value::Bool(false));
        raw.insert("skipped".into(), Value::Bool(true));
        raw.insert("reason".into(), Value::String(reason.to_string()));
        Self::from_map(raw)
    }

    /// Wraps a bridge response.
    ///
    /// Objects are kept as sent; any other JSON value means the bridge
    /// accepted without details and becomes `{ok: true}`.
    #[must_use]
    pub fn from_response(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::accepted(),
        }
    }

    fn from_map(raw: Map<String, Value>) -> Self {
        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        let task_id = match raw.get("task_id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self {
            // Only a literal `true` counts as acceptance.
            ok: raw.get("ok").and_then(Value::as_bool).unwrap_or(false),
            skipped: raw.get("skipped").and_then(Value::as_bool).unwrap_or(false),
            reason: text("reason"),
            task_id,
            error: text("error"),
            raw,
        }
    }

    /// Whether the bridge took the download.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Set when no I/O was attempted because a prerequisite was missing.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Task id, with numeric ids rendered as text.
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The response object as received.
    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Human-readable reason for a refusal: `reason`, else `error`, else a
    /// generic fallback.
    #[must_use]
    pub fn refusal_reason(&self) -> String {
        [self.reason(), self.error()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("bridge rejected request")
            .to_string()
    }
}
