//! Host allow-list for download interception.
//!
//! An empty rule set accepts every host. A non-empty set accepts a URL only if
//! its host equals a rule or is a subdomain of one; URLs without a parseable
//! host are rejected.

use tracing::trace;
use url::Url;

/// Parses raw allow-list text into lower-cased host rules.
///
/// Tokens are split on commas and newlines, trimmed, and empty tokens are
/// dropped. Order is preserved and duplicates are kept.
#[must_use]
pub fn parse(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Returns whether `url`'s host passes `rules`.
#[must_use]
pub fn is_allowed(url: &str, rules: &[String]) -> bool {
    if rules.is_empty() {
        return true;
    }
    let Some(host) = host_of(url) else {
        trace!(url, "no host in url, rejecting");
        return false;
    };
    rules.iter().any(|rule| {
        let rule = rule.trim_end_matches('.');
        !rule.is_empty() && (host == rule || host.ends_with(&format!(".{rule}")))
    })
}

fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    // Fully qualified names (`example.com.`) match their relative form.
    let host = parsed.host_str()?.trim_end_matches('.').to_lowercase();
    (!host.is_empty()).then_some(host)
}
