//! Utility functions and helpers.

#[cfg(feature = "fetch")]
pub mod http;
pub mod log;

use url::Url;

/// Extract the domain from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Domain recorded in history for a page location; empty when the page has
/// no host (local files, `about:blank`).
pub fn history_domain(location: Option<&str>) -> String {
    location.and_then(get_domain).unwrap_or_default()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
