//! User-Agent string for bridge HTTP traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/lc5900/flamingo-downloader";

/// Default User-Agent for requests to the bridge endpoint and from the native host.
#[must_use]
pub(crate) fn default_bridge_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("flamingo-bridge/{version} (+{PROJECT_UA_URL})")
}
