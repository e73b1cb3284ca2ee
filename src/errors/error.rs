//! Crate-level error type.

use thiserror::Error;

/// Result type alias for remote tool operations
pub type RemoteToolResult<T> = Result<T, RemoteToolError>;

/// Main error type for building and configuring the remote tool layer.
///
/// Invocation failures never surface as this type; they are resolved into an
/// [`Outcome`](crate::types::Outcome) by the orchestrator.
#[derive(Error, Debug, Clone)]
pub enum RemoteToolError {
    /// Configuration error (invalid settings, missing required fields)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Transport error (the HTTP client could not be constructed)
    #[error("Transport error: {message}")]
    Transport {
        /// Error message describing the transport issue
        message: String,
    },
}

impl From<reqwest::Error> for RemoteToolError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            RemoteToolError::Configuration {
                message: format!("Invalid HTTP client settings: {}", err),
            }
        } else {
            RemoteToolError::Transport {
                message: format!("Failed to create HTTP client: {}", err),
            }
        }
    }
}

impl From<url::ParseError> for RemoteToolError {
    fn from(err: url::ParseError) -> Self {
        RemoteToolError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
