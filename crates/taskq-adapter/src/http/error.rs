/*
[INPUT]:  Error sources (transport, backend status, serialization, URL)
[OUTPUT]: Structured error types with classification helpers
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the task-queue adapter
#[derive(Error, Debug)]
pub enum TaskqError {
    /// Request never completed (connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl TaskqError {
    /// True when the request did not complete at all.
    pub fn is_network(&self) -> bool {
        matches!(self, TaskqError::Network(_))
    }

    /// HTTP status for backend errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            TaskqError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Build a backend error from a status code and response body.
    ///
    /// Spring sends an empty body for `badRequest().build()`, so the
    /// canonical reason phrase stands in for it.
    pub fn backend_error(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            body
        };
        TaskqError::Backend {
            status: status.as_u16(),
            message,
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, TaskqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_creation() {
        let err = TaskqError::backend_error(StatusCode::BAD_REQUEST, "Invalid task type");
        match err {
            TaskqError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid task type");
            }
            _ => panic!("Expected Backend error variant"),
        }
    }

    #[test]
    fn test_backend_error_empty_body_uses_reason() {
        let err = TaskqError::backend_error(StatusCode::INTERNAL_SERVER_ERROR, "  ");
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Internal Server Error"));
        assert!(!err.is_network());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(TaskqError::backend_error(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(!TaskqError::Config("x".into()).is_not_found());
    }
}
