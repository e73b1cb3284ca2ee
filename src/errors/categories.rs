//! Per-attempt failure taxonomy.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified category of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller's input was malformed. Never retried.
    Validation,
    /// Network, timeout or overload failure. Retried up to the configured limit.
    Transient,
    /// Misconfiguration such as a missing credential. Never retried.
    Fatal,
}

impl ErrorCategory {
    /// Returns true if another attempt could change the result.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Transient)
    }

    /// Stable lowercase name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Transient => "transient",
            ErrorCategory::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse status class of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// The service answered with a 4xx-class response
    ClientError,
    /// The service answered with a 5xx-class response
    ServerError,
    /// No response was received at all
    NoResponse,
}

/// What went wrong, as far as the transport could tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// An HTTP response with a non-success status
    Http,
    /// The attempt exceeded its deadline
    Timeout,
    /// The connection was refused or reset
    ConnectionRefused,
    /// The host name could not be resolved
    Dns,
    /// The input was rejected locally before being sent
    MalformedInput,
    /// A required credential is not configured
    MissingCredential,
    /// The configured credential was rejected
    InvalidCredential,
    /// The client itself is misconfigured (bad URL, bad header value)
    Misconfigured,
    /// The response could not be decoded
    Decode,
    /// Anything the transport did not recognise
    Other,
}

/// Raw failure information produced by exactly one remote-call attempt.
///
/// Signals are immutable once created; the orchestrator hands them to a
/// [`FailureClassifier`](super::FailureClassifier) and then drops them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSignal {
    status_class: StatusClass,
    status_code: Option<u16>,
    kind: FailureKind,
    message: Option<String>,
}

impl FailureSignal {
    /// Creates a signal from its parts.
    pub fn new(status_class: StatusClass, kind: FailureKind) -> Self {
        Self {
            status_class,
            status_code: None,
            kind,
            message: None,
        }
    }

    /// Creates a signal from a non-success HTTP status and optional body detail.
    pub fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        let status_class = if status.is_server_error() {
            StatusClass::ServerError
        } else if status.is_client_error() {
            StatusClass::ClientError
        } else {
            // 1xx/3xx on a call that expected 2xx: the service did not answer usefully
            StatusClass::NoResponse
        };
        Self {
            status_class,
            status_code: Some(status.as_u16()),
            kind: FailureKind::Http,
            message: detail,
        }
    }

    /// The attempt timed out.
    pub fn timeout() -> Self {
        Self::new(StatusClass::NoResponse, FailureKind::Timeout)
    }

    /// The connection was refused.
    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self::new(StatusClass::NoResponse, FailureKind::ConnectionRefused).with_message(message)
    }

    /// Name resolution failed.
    pub fn dns(message: impl Into<String>) -> Self {
        Self::new(StatusClass::NoResponse, FailureKind::Dns).with_message(message)
    }

    /// The input was detected as malformed before it left the process.
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::new(StatusClass::ClientError, FailureKind::MalformedInput).with_message(message)
    }

    /// No credential is configured for a service that requires one.
    pub fn missing_credential() -> Self {
        Self::new(StatusClass::NoResponse, FailureKind::MissingCredential)
            .with_message("credential not configured")
    }

    /// The credential was rejected.
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::new(StatusClass::ClientError, FailureKind::InvalidCredential).with_message(message)
    }

    /// The client is misconfigured.
    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::new(StatusClass::NoResponse, FailureKind::Misconfigured).with_message(message)
    }

    /// A response arrived but could not be decoded.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(StatusClass::NoResponse, FailureKind::Decode).with_message(message)
    }

    /// Unrecognised failure.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StatusClass::NoResponse, FailureKind::Other).with_message(message)
    }

    /// Attaches a message to the signal.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches an HTTP status code to the signal.
    pub fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Status class of the failure
    pub fn status_class(&self) -> StatusClass {
        self.status_class
    }

    /// HTTP status code, if the service answered
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Failure kind
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Raw message. Internal only: never shown to end users.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for FailureSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.status_class, self.kind)?;
        if let Some(code) = self.status_code {
            write!(f, " ({})", code)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}
