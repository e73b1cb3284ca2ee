//! Request and outcome types shared across the crate.

use crate::errors::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request to invoke one operation on a remote dependency.
///
/// The payload is opaque to this layer and is expected to have been validated
/// by the caller already.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Operation identifier (e.g. `"calculate"`)
    pub operation: String,
    /// Opaque request payload
    pub payload: serde_json::Value,
}

impl InvocationRequest {
    /// Creates a new invocation request
    pub fn new(operation: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            operation: operation.into(),
            payload,
        }
    }
}

/// Why a failed invocation was returned to the caller.
///
/// Operators see this in diagnostic records; end users never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureResolution {
    /// A Validation or Fatal failure ended the sequence after one attempt
    NonRetryable,
    /// Every allowed attempt failed transiently
    RetriesExhausted,
    /// The circuit breaker rejected admission
    CircuitOpen,
    /// The pre-flight health probe reported the dependency down
    Unhealthy,
}

impl FailureResolution {
    /// Stable lowercase name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureResolution::NonRetryable => "non_retryable",
            FailureResolution::RetriesExhausted => "retries_exhausted",
            FailureResolution::CircuitOpen => "circuit_open",
            FailureResolution::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for FailureResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller-facing part of a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationFailure {
    /// Final error category
    pub category: ErrorCategory,
    /// Fixed, user-safe message for the category
    pub user_message: String,
}

/// Final resolved result of a full invocation sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The remote operation succeeded
    Success(T),
    /// The sequence ended in a categorized failure
    Failure(InvocationFailure),
}

impl<T> Outcome<T> {
    /// Returns true on success
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns the failure category, if any
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure.category),
        }
    }

    /// Returns the success value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Returns the user message of a failure, if any
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(&failure.user_message),
        }
    }

    /// Maps the success value
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Converts into a standard `Result`
    pub fn into_result(self) -> Result<T, InvocationFailure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(failure) => Err(failure),
        }
    }
}
