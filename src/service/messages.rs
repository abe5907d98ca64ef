//! Request/response protocol between UI surfaces and the core.

use serde::{Deserialize, Serialize};

use crate::bridge::DispatchOutcome;
use crate::candidates::MediaCandidate;
use crate::config::ConfigPatch;

/// A UI request, tagged by its `action` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    ListMediaCandidates,
    ClearMediaCandidates,
    SendMediaCandidate {
        url: String,
        #[serde(default, rename = "saveDir", alias = "save_dir")]
        save_dir: Option<String>,
    },
    GetQuickState,
    SetQuickFlags(QuickFlags),
    PingBridge,
}

/// The toggles the popup may flip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFlags {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub sniff_media_enabled: Option<bool>,
    #[serde(default)]
    pub auto_intercept: Option<bool>,
}

impl From<QuickFlags> for ConfigPatch {
    fn from(flags: QuickFlags) -> Self {
        Self {
            enabled: flags.enabled,
            sniff_media_enabled: flags.sniff_media_enabled,
            auto_intercept: flags.auto_intercept,
            ..Self::default()
        }
    }
}

/// Summary shown by the popup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickState {
    pub enabled: bool,
    pub sniff_media_enabled: bool,
    pub auto_intercept: bool,
    pub media_count: usize,
    pub last_bridge_error: Option<String>,
    pub last_bridge_success: Option<String>,
    pub last_bridge_skip: Option<String>,
    pub last_bridge_activity_at: Option<i64>,
}

/// Reply to a [`Request`]. Every variant serializes to an object with `ok`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Candidates { ok: bool, items: Vec<MediaCandidate> },
    State { ok: bool, state: QuickState },
    Dispatch(DispatchOutcome),
    Ack { ok: bool },
    Failure { ok: bool, error: String },
}

impl Response {
    #[must_use]
    pub fn ack() -> Self {
        Self::Ack { ok: true }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            ok: false,
            error: error.into(),
        }
    }

    #[must_use]
    pub fn candidates(items: Vec<MediaCandidate>) -> Self {
        Self::Candidates { ok: true, items }
    }

    #[must_use]
    pub fn state(state: QuickState) -> Self {
        Self::State { ok: true, state }
    }

    /// Whether the request succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Candidates { ok, .. }
            | Self::State { ok, .. }
            | Self::Ack { ok }
            | Self::Failure { ok, .. } => *ok,
            Self::Dispatch(outcome) => outcome.is_ok(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_parses_each_action() {
        let cases = [
            (json!({"action": "list_media_candidates"}), Request::ListMediaCandidates),
            (json!({"action": "clear_media_candidates"}), Request::ClearMediaCandidates),
            (json!({"action": "get_quick_state"}), Request::GetQuickState),
            (json!({"action": "ping_bridge"}), Request::PingBridge),
            (
                json!({"action": "send_media_candidate", "url": "https://e.com/a.mp4", "saveDir": "/dl"}),
                Request::SendMediaCandidate {
                    url: "https://e.com/a.mp4".into(),
                    save_dir: Some("/dl".into()),
                },
            ),
            (
                json!({"action": "set_quick_flags", "enabled": true, "autoIntercept": false}),
                Request::SetQuickFlags(QuickFlags {
                    enabled: Some(true),
                    sniff_media_enabled: None,
                    auto_intercept: Some(false),
                }),
            ),
        ];
        for (raw, expected) in cases {
            let parsed: Request = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(parsed, expected, "raw: {raw}");
        }
    }

    #[test]
    fn test_request_unknown_action_is_error() {
        assert!(serde_json::from_value::<Request>(json!({"action": "explode"})).is_err());
        assert!(serde_json::from_value::<Request>(json!({"url": "x"})).is_err());
    }

    #[test]
    fn test_send_request_requires_url() {
        assert!(
            serde_json::from_value::<Request>(json!({"action": "send_media_candidate"})).is_err()
        );
    }

    #[test]
    fn test_response_shapes() {
        assert_eq!(serde_json::to_value(Response::ack()).unwrap(), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(Response::failure("nope")).unwrap(),
            json!({"ok": false, "error": "nope"})
        );
        assert_eq!(
            serde_json::to_value(Response::candidates(Vec::new())).unwrap(),
            json!({"ok": true, "items": []})
        );
        let state = serde_json::to_value(Response::state(QuickState::default())).unwrap();
        assert_eq!(state["state"]["mediaCount"], json!(0));
        assert_eq!(state["state"]["lastBridgeError"], json!(null));
    }

    #[test]
    fn test_quick_flags_convert_to_patch() {
        let patch = ConfigPatch::from(QuickFlags {
            sniff_media_enabled: Some(false),
            ..QuickFlags::default()
        });
        assert_eq!(patch.sniff_media_enabled, Some(false));
        assert!(patch.token.is_none());
    }
}
