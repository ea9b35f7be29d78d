//! Shared utility functions for the checkout gateway.

use axum::http::HeaderMap;

/// Minor units per major unit for the two-decimal currencies the catalog uses.
const MINOR_PER_MAJOR: f64 = 100.0;

/// Convert a provider amount in minor units (cents) to major units.
pub fn minor_to_major(amount: i64) -> f64 {
    amount as f64 / MINOR_PER_MAJOR
}

/// Convert a major-unit amount to minor units, rounding to the nearest cent.
pub fn major_to_minor(amount: f64) -> i64 {
    (amount * MINOR_PER_MAJOR).round() as i64
}

/// Append query parameters to a URL
pub fn append_query_params(base_url: &str, params: &[(&str, &str)]) -> String {
    let query_string: String = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    if base_url.contains('?') {
        format!("{}&{}", base_url, query_string)
    } else {
        format!("{}?{}", base_url, query_string)
    }
}

/// Read a header as a trimmed, non-empty string.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
