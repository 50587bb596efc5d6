//! Error types used throughout the streaming subsystem
//!
//! `StreamError` carries the *cause* of a failure. Whether a given error is
//! worth a recovery attempt is decided elsewhere (the keyword classifier in
//! `rivulet-core`), based on the rendered message text, so every variant's
//! `Display` output must surface the underlying cause text verbatim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for stream operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StreamError {
    /// Connection-level failure (reset, refused, DNS, broken pipe)
    #[error("network error: {0}")]
    Network(String),

    /// The transport or the upstream service stopped responding
    #[error("timeout: {0}")]
    Timeout(String),

    /// The upstream provider answered with an error status
    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider is throttling this client
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Credentials were rejected; never retried
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Malformed payload from the upstream service
    #[error("parse error: {0}")]
    Parse(String),

    /// A recoverable failure survived every allowed recovery attempt
    #[error("recovery attempts exhausted after {attempts} retries")]
    RetriesExhausted { attempts: u32 },

    /// The consumer cancelled the session
    #[error("stream cancelled by consumer")]
    Cancelled,

    /// Anything that does not fit the categories above
    #[error("internal error: {0}")]
    Internal(String),
}

impl StreamError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a provider error
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider { status, message: message.into() }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status to report for this error, where one applies
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(429),
            Self::Timeout(_) => Some(504),
            Self::Network(_) => Some(502),
            Self::Authentication(_) => Some(401),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result type alias for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_surfaces_cause_text() {
        let err = StreamError::network("connection reset by peer");
        assert_eq!(err.to_string(), "network error: connection reset by peer");

        let err = StreamError::provider(503, "service unavailable");
        assert_eq!(err.to_string(), "provider error (503): service unavailable");

        let err = StreamError::RetriesExhausted { attempts: 3 };
        assert!(err.to_string().contains("3 retries"));
    }

    #[test]
    fn status_codes_map_by_category() {
        assert_eq!(StreamError::timeout("no chunk").status_code(), Some(504));
        assert_eq!(StreamError::network("refused").status_code(), Some(502));
        assert_eq!(StreamError::provider(429, "slow down").status_code(), Some(429));
        assert_eq!(StreamError::Authentication("bad key".into()).status_code(), Some(401));
        assert_eq!(StreamError::Cancelled.status_code(), None);
    }

    #[test]
    fn io_error_converts_to_network() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: StreamError = io_err.into();
        assert!(matches!(err, StreamError::Network(_)));
    }

    #[test]
    fn serialization_round_trips() {
        let err = StreamError::provider(502, "bad gateway");
        let json = serde_json::to_string(&err).expect("serialize");
        let back: StreamError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(err, back);
    }
}
