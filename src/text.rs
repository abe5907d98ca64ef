//! Small string and time helpers shared by the bridge components.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Upper bound for any error or activity message kept by the core.
pub const MAX_MESSAGE_CHARS: usize = 400;

/// Cuts `message` to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => message[..byte_idx].to_string(),
        None => message.to_string(),
    }
}

/// Cuts `message` to [`MAX_MESSAGE_CHARS`].
#[must_use]
pub fn truncate_message(message: &str) -> String {
    truncate_chars(message, MAX_MESSAGE_CHARS)
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// Source of "now" in epoch milliseconds, injectable for deterministic tests.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// A [`Clock`] reading the system time.
#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(now_millis)
}
