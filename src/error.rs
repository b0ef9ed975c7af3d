//! Error types for the pair stats SDK

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`FetchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Non-2xx status, network failure or timeout
    Transport,
    /// The response body did not have the expected shape
    SchemaInvalid,
    /// The envelope was valid but held no pairs
    NoData,
    /// The caller cancelled the request
    Cancelled,
}

impl ErrorKind {
    /// Returns the kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::SchemaInvalid => "SCHEMA_INVALID",
            ErrorKind::NoData => "NO_DATA",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when fetching pair data
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// Request failed at the HTTP layer
    #[error("{message}")]
    Transport {
        /// HTTP status code, if a response was received
        status: Option<u16>,
        message: String,
    },

    /// Response body failed shape validation
    #[error("Invalid API response: {0}")]
    SchemaInvalid(String),

    /// Response envelope held no pairs
    #[error("No pair data found")]
    NoData,

    /// Request was abandoned by the caller
    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Creates a Transport error without an HTTP status
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: msg.into(),
        }
    }

    /// Creates a Transport error from a non-2xx HTTP status
    pub fn http_status(status: u16, reason: &str) -> Self {
        Self::Transport {
            status: Some(status),
            message: format!("HTTP {}: {}", status, reason),
        }
    }

    /// Creates a SchemaInvalid error
    pub fn schema_invalid(msg: impl Into<String>) -> Self {
        Self::SchemaInvalid(msg.into())
    }

    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport { .. } => ErrorKind::Transport,
            FetchError::SchemaInvalid(_) => ErrorKind::SchemaInvalid,
            FetchError::NoData => ErrorKind::NoData,
            FetchError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns true if repeating the request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    /// HTTP status code, if the error came from a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport(format!("Request timeout: {}", err))
        } else {
            Self::Transport {
                status: err.status().map(|s| s.as_u16()),
                message: format!("Network error: {}", err),
            }
        }
    }
}

/// Errors in runtime configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was not provided
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    /// A value was provided but is not usable
    #[error("Invalid configuration value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    /// Creates an Invalid error
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = FetchError::http_status(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(FetchError::transport("boom").is_retryable());
        assert!(!FetchError::schema_invalid("missing field `url`").is_retryable());
        assert!(!FetchError::NoData.is_retryable());
        assert!(!FetchError::Cancelled.is_retryable());
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(FetchError::NoData.to_string(), "No pair data found");
        assert_eq!(
            FetchError::schema_invalid("pairs must be an array").to_string(),
            "Invalid API response: pairs must be an array"
        );
        assert_eq!(ErrorKind::SchemaInvalid.to_string(), "SCHEMA_INVALID");
    }
}
