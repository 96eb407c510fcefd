//! Error types for the Tagport migration engine.
//!
//! Distinguishes transient remote failures (retried), authentication
//! failures (fatal to the run), per-item data problems (skip or warn),
//! and write-guard violations (contract bugs that must surface loudly).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Tagport operations.
#[derive(Debug, Error)]
pub enum TagportError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Rate limited by {service}, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    // Authentication errors
    #[error("Front authentication failed: {message}")]
    SourceAuth { message: String },

    #[error("Gmail authentication failed: {message}")]
    TargetAuth { message: String },

    #[error("No credentials supplied for {service}")]
    MissingCredentials { service: String },

    // Remote API errors
    #[error("{service} API error: {message}")]
    Api {
        service: String,
        message: String,
        status_code: Option<u16>,
    },

    // Write-guard violation: a mutation was requested in read-only mode.
    #[error("Write blocked in read-only mode: {operation}")]
    WriteBlocked { operation: String },

    // Label reconciliation errors
    #[error("Label not found after reconciliation: {name}")]
    LabelNotFound { name: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for Tagport operations.
pub type Result<T> = std::result::Result<T, TagportError>;

/// Whether an HTTP status code indicates a transient failure worth retrying.
pub fn retryable_status(code: u16) -> bool {
    matches!(code, 408 | 429) || (500..600).contains(&code)
}

// Conversion implementations for common error types

impl From<reqwest::Error> for TagportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TagportError::Timeout(crate::config::NetworkTuning::REQUEST_TIMEOUT)
        } else {
            TagportError::Network {
                message: err.to_string(),
                cause: Some(err.to_string()),
            }
        }
    }
}

impl From<serde_json::Error> for TagportError {
    fn from(err: serde_json::Error) -> Self {
        TagportError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<std::io::Error> for TagportError {
    fn from(err: std::io::Error) -> Self {
        TagportError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl TagportError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        TagportError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Check if this error should trigger a retry.
    ///
    /// Rate limits, 5xx-class API responses, timeouts, and transport
    /// failures are transient. Authentication rejections are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TagportError::Network { .. }
            | TagportError::Timeout(_)
            | TagportError::RateLimited { .. } => true,
            TagportError::Api {
                status_code: Some(code),
                ..
            } => retryable_status(*code),
            _ => false,
        }
    }

    /// Check if this error is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            TagportError::SourceAuth { .. }
                | TagportError::TargetAuth { .. }
                | TagportError::MissingCredentials { .. }
        )
    }

    /// Check if this error must abort the whole run rather than fail one item.
    ///
    /// Authentication failures mean no forward progress is possible, and a
    /// blocked write means the dry-run contract was violated.
    pub fn is_fatal(&self) -> bool {
        self.is_auth() || matches!(self, TagportError::WriteBlocked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TagportError::WriteBlocked {
            operation: "acquire mutator".into(),
        };
        assert_eq!(
            err.to_string(),
            "Write blocked in read-only mode: acquire mutator"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(TagportError::Timeout(std::time::Duration::from_secs(5)).is_retryable());
        assert!(TagportError::RateLimited {
            service: "Gmail".into(),
            retry_after_secs: None,
        }
        .is_retryable());
        assert!(TagportError::Api {
            service: "Front".into(),
            message: "server error".into(),
            status_code: Some(503),
        }
        .is_retryable());
        assert!(!TagportError::Api {
            service: "Front".into(),
            message: "bad request".into(),
            status_code: Some(400),
        }
        .is_retryable());
        assert!(!TagportError::SourceAuth {
            message: "token rejected".into(),
        }
        .is_retryable());
    }

    #[test]
    fn test_auth_errors_are_fatal() {
        assert!(TagportError::SourceAuth {
            message: "token rejected".into(),
        }
        .is_fatal());
        assert!(TagportError::MissingCredentials {
            service: "Gmail".into(),
        }
        .is_fatal());
        assert!(TagportError::WriteBlocked {
            operation: "ensure_label".into(),
        }
        .is_fatal());
        assert!(!TagportError::RateLimited {
            service: "Front".into(),
            retry_after_secs: Some(30),
        }
        .is_fatal());
    }

    #[test]
    fn test_retryable_status_codes() {
        assert!(retryable_status(429));
        assert!(retryable_status(500));
        assert!(retryable_status(503));
        assert!(retryable_status(408));
        assert!(!retryable_status(200));
        assert!(!retryable_status(401));
        assert!(!retryable_status(404));
    }
}
