//! MGT client error types

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the stop forecast API
#[derive(Debug, Error)]
pub enum MgtError {
    /// Base URL and endpoint do not combine into a valid request
    #[error("Failed to build request: {0}")]
    RequestConstruction(String),

    /// Transport-level failure (DNS, refused connection, broken body stream)
    #[error("Network error: {0}")]
    Network(String),

    /// No complete response within the request timeout
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// The API answered with anything other than HTTP 200
    #[error("Unexpected status code: {status}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Leading part of the response body, if it could be read
        body: Option<String>,
    },

    /// The response body is not the expected JSON document
    #[error("Decode error: {0}")]
    Decode(String),

    /// The HTTP client could not be initialized
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MgtError {
    /// Returns true for transport-level failures, timeouts included
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout { .. })
    }

    /// Returns true if repeating the call might succeed
    ///
    /// The client never retries on its own; this is advice for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.is_network()
    }

    /// HTTP status carried by [`MgtError::UnexpectedStatus`]
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(MgtError::Network("refused".to_string()).is_retryable());
        assert!(
            MgtError::Timeout {
                timeout: Duration::from_secs(10)
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!MgtError::RequestConstruction("bad url".to_string()).is_retryable());
        assert!(!MgtError::Decode("eof".to_string()).is_retryable());
        assert!(!MgtError::Configuration("tls".to_string()).is_retryable());
        assert!(
            !MgtError::UnexpectedStatus {
                status: 503,
                body: None
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_status_accessor() {
        let err = MgtError::UnexpectedStatus {
            status: 404,
            body: Some("not found".to_string()),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(MgtError::Decode("x".to_string()).status(), None);
    }

    #[test]
    fn test_error_display() {
        let err = MgtError::UnexpectedStatus {
            status: 500,
            body: None,
        };
        assert_eq!(err.to_string(), "Unexpected status code: 500");

        let err = MgtError::Timeout {
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Request timed out after 10s");

        let err = MgtError::Timeout {
            timeout: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "Request timed out after 200ms");

        let err = MgtError::Decode("expected value at line 1 column 1".to_string());
        assert!(err.to_string().starts_with("Decode error"));
    }
}
