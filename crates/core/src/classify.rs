//! Recoverable-error classification
//!
//! Transport layers and provider SDKs disagree wildly about error types, but
//! their message text is consistent enough to act on. Classification is a
//! case-insensitive substring match against a fixed allow-list; anything the
//! list does not name is treated as non-recoverable and never retried.
//!
//! Keep the list tight: an over-broad match turns a permanent failure (bad
//! credentials, malformed request) into a retry loop.

/// Message fragments that mark an error as transient.
///
/// Covers connection resets, timeouts, DNS failures, hung sockets, broken
/// pipes, upstream gateway errors (502/503/504) and rate-limit phrasing.
const RECOVERABLE_FRAGMENTS: &[&str] = &[
    // Connection resets
    "econnreset",
    "connection reset",
    // Timeouts
    "etimedout",
    "timed out",
    "timeout",
    // DNS failures
    "enotfound",
    "dns error",
    "name not resolved",
    // Hung or torn-down sockets
    "socket hang up",
    "epipe",
    "broken pipe",
    // Generic transient phrasing
    "network",
    "abort",
    // Upstream gateway errors
    "502",
    "bad gateway",
    "503",
    "service unavailable",
    "504",
    "gateway timeout",
    // Throttling
    "rate limit",
    "too many requests",
    "overloaded",
];

/// Whether an error message describes a transient failure worth a bounded
/// retry.
pub fn is_recoverable(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    RECOVERABLE_FRAGMENTS.iter().any(|fragment| message.contains(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_resets_are_recoverable() {
        assert!(is_recoverable("read ECONNRESET"));
        assert!(is_recoverable("Connection reset by peer"));
    }

    #[test]
    fn timeouts_are_recoverable() {
        assert!(is_recoverable("ETIMEDOUT"));
        assert!(is_recoverable("request timed out after 30s"));
        assert!(is_recoverable("operation timeout"));
    }

    #[test]
    fn dns_failures_are_recoverable() {
        assert!(is_recoverable("getaddrinfo ENOTFOUND api.example.com"));
        assert!(is_recoverable("dns error: no record found"));
    }

    #[test]
    fn hung_sockets_and_pipes_are_recoverable() {
        assert!(is_recoverable("socket hang up"));
        assert!(is_recoverable("write EPIPE"));
        assert!(is_recoverable("Broken pipe (os error 32)"));
    }

    #[test]
    fn gateway_errors_are_recoverable() {
        assert!(is_recoverable("provider error (502): Bad Gateway"));
        assert!(is_recoverable("503 Service Unavailable"));
        assert!(is_recoverable("upstream returned 504"));
    }

    #[test]
    fn rate_limits_are_recoverable() {
        assert!(is_recoverable("rate limit exceeded, retry later"));
        assert!(is_recoverable("429 Too Many Requests"));
        assert!(is_recoverable("the service is currently overloaded"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(is_recoverable("SOCKET HANG UP"));
        assert!(is_recoverable("Rate Limit"));
    }

    #[test]
    fn permanent_failures_are_not_recoverable() {
        assert!(!is_recoverable("invalid_api_key"));
        assert!(!is_recoverable("authentication error: bad credentials"));
        assert!(!is_recoverable("provider error (400): malformed request"));
        assert!(!is_recoverable("parse error: unexpected token"));
        assert!(!is_recoverable(""));
    }
}
