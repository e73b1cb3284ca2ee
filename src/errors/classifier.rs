//! Maps raw failure signals onto error categories.

use super::categories::{ErrorCategory, FailureKind, FailureSignal, StatusClass};

/// Client-error statuses that indicate configuration or authorization problems.
const FATAL_CLIENT_STATUSES: [u16; 4] = [401, 403, 404, 405];

/// Client-error statuses that indicate a transient condition.
const TRANSIENT_CLIENT_STATUSES: [u16; 2] = [408, 429];

/// Body fragments that mark a 4xx response as an input rejection.
const DEFAULT_VALIDATION_MARKERS: [&str; 8] = [
    "invalid",
    "expression",
    "division by zero",
    "calculation error",
    "malformed",
    "validation",
    "cannot be empty",
    "too long",
];

/// Classifies a [`FailureSignal`] into exactly one [`ErrorCategory`].
///
/// Implementations must be pure and total: every signal maps to a category and
/// classification has no side effects.
pub trait FailureClassifier: Send + Sync {
    /// Classify one failed attempt
    fn classify(&self, signal: &FailureSignal) -> ErrorCategory;
}

/// Rule-based classifier.
///
/// Rules are applied in priority order: input rejections are `Validation`,
/// credential and configuration problems are `Fatal`, and everything else,
/// including signals nothing recognises, is `Transient`.
#[derive(Debug, Clone)]
pub struct DefaultFailureClassifier {
    validation_markers: Vec<String>,
}

impl DefaultFailureClassifier {
    /// Create a classifier with the default validation markers
    pub fn new() -> Self {
        Self {
            validation_markers: DEFAULT_VALIDATION_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    /// Replace the body fragments used to recognise validation rejections.
    ///
    /// Markers are matched case-insensitively.
    pub fn with_validation_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_markers = markers
            .into_iter()
            .map(|m| m.into().to_lowercase())
            .collect();
        self
    }

    fn reads_as_validation(&self, message: Option<&str>) -> bool {
        let Some(message) = message else {
            return false;
        };
        let message = message.to_lowercase();
        self.validation_markers
            .iter()
            .any(|marker| message.contains(marker.as_str()))
    }

    fn is_validation(&self, signal: &FailureSignal) -> bool {
        if signal.kind() == FailureKind::MalformedInput {
            return true;
        }
        if signal.status_class() != StatusClass::ClientError || signal.kind() != FailureKind::Http {
            return false;
        }
        match signal.status_code() {
            Some(400) | Some(422) => true,
            Some(code)
                if FATAL_CLIENT_STATUSES.contains(&code)
                    || TRANSIENT_CLIENT_STATUSES.contains(&code) =>
            {
                false
            }
            _ => self.reads_as_validation(signal.message()),
        }
    }

    fn is_fatal(signal: &FailureSignal) -> bool {
        match signal.kind() {
            FailureKind::MissingCredential
            | FailureKind::InvalidCredential
            | FailureKind::Misconfigured => true,
            _ => {
                signal.status_class() == StatusClass::ClientError
                    && signal
                        .status_code()
                        .map_or(false, |code| FATAL_CLIENT_STATUSES.contains(&code))
            }
        }
    }
}

impl Default for DefaultFailureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureClassifier for DefaultFailureClassifier {
    fn classify(&self, signal: &FailureSignal) -> ErrorCategory {
        if self.is_validation(signal) {
            return ErrorCategory::Validation;
        }
        if Self::is_fatal(signal) {
            return ErrorCategory::Fatal;
        }
        // Server errors, missing responses, timeouts, refused connections,
        // DNS failures, 408/429 and anything unrecognised.
        ErrorCategory::Transient
    }
}
