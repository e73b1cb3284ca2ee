use super::redaction::Redactor;
use crate::errors::{ErrorCategory, FailureSignal};
use crate::types::{FailureResolution, InvocationFailure};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Everything the orchestrator knows about a failed invocation sequence.
#[derive(Debug, Clone)]
pub struct FailedInvocation {
    /// Final category
    pub category: ErrorCategory,
    /// Why the sequence ended
    pub resolution: FailureResolution,
    /// Remote attempts actually made
    pub attempt_count: u32,
    /// Dependency invoked
    pub service_id: String,
    /// Operation invoked
    pub operation: String,
    /// Raw request payload, redacted before it leaves the reporter
    pub input: Value,
    /// Signal of the last failed attempt, if one was made
    pub last_failure: Option<FailureSignal>,
}

/// Operator-facing record of one failed invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    /// Unique id, for correlating with user reports
    pub id: Uuid,
    /// Final category
    pub category: ErrorCategory,
    /// Why the sequence ended
    pub resolution: FailureResolution,
    /// Remote attempts actually made
    pub attempt_count: u32,
    /// Dependency invoked
    pub service_id: String,
    /// Operation invoked
    pub operation: String,
    /// When the failure was reported
    pub timestamp: DateTime<Utc>,
    /// Request payload with credentials masked
    pub redacted_input: Value,
    /// Last failure signal, scrubbed
    pub last_failure: Option<String>,
}

/// Destination for diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    /// Accept one record. Must not panic.
    fn emit(&self, record: &DiagnosticRecord);
}

/// Emits records as structured `tracing` events.
///
/// Transient failures log at `warn`, Fatal at `error`, Validation at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnosticSink;

impl DiagnosticSink for TracingDiagnosticSink {
    fn emit(&self, record: &DiagnosticRecord) {
        let last_failure = record.last_failure.as_deref().unwrap_or("none");
        match record.category {
            ErrorCategory::Transient => tracing::warn!(
                record_id = %record.id,
                category = %record.category,
                resolution = %record.resolution,
                attempt_count = record.attempt_count,
                dependency = %record.service_id,
                operation = %record.operation,
                timestamp = %record.timestamp.to_rfc3339(),
                redacted_input = %record.redacted_input,
                last_failure = last_failure,
                "Remote invocation failed"
            ),
            ErrorCategory::Fatal => tracing::error!(
                record_id = %record.id,
                category = %record.category,
                resolution = %record.resolution,
                attempt_count = record.attempt_count,
                dependency = %record.service_id,
                operation = %record.operation,
                timestamp = %record.timestamp.to_rfc3339(),
                redacted_input = %record.redacted_input,
                last_failure = last_failure,
                "Remote invocation failed"
            ),
            ErrorCategory::Validation => tracing::info!(
                record_id = %record.id,
                category = %record.category,
                resolution = %record.resolution,
                attempt_count = record.attempt_count,
                dependency = %record.service_id,
                operation = %record.operation,
                timestamp = %record.timestamp.to_rfc3339(),
                redacted_input = %record.redacted_input,
                last_failure = last_failure,
                "Remote invocation rejected input"
            ),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct InMemoryDiagnosticSink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl InMemoryDiagnosticSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record emitted so far
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    /// Most recent record
    pub fn last(&self) -> Option<DiagnosticRecord> {
        self.records.lock().last().cloned()
    }

    /// Number of records emitted
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticSink for InMemoryDiagnosticSink {
    fn emit(&self, record: &DiagnosticRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Fixed user-safe message for a category.
///
/// Never includes remote error text.
pub fn user_message(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Validation => {
            "The request could not be processed because the input is invalid. Please check it and try again."
        }
        ErrorCategory::Transient => "The service is temporarily unavailable. Please try again shortly.",
        ErrorCategory::Fatal => {
            "The service cannot be reached because of a configuration problem. Please contact the operator."
        }
    }
}

/// Turns failed invocations into a user-safe result plus a diagnostic record.
#[derive(Clone)]
pub struct ErrorReporter {
    redactor: Redactor,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(Arc::new(TracingDiagnosticSink))
    }
}

impl ErrorReporter {
    /// Reporter that emits to `sink`
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            redactor: Redactor::default(),
            sink,
        }
    }

    /// Replace the redactor
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Redactor applied to inputs and failure text
    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// Emit a diagnostic record and return the caller-facing failure
    pub fn report(&self, failed: &FailedInvocation) -> InvocationFailure {
        let record = self.record_for(failed);
        self.sink.emit(&record);

        InvocationFailure {
            category: failed.category,
            user_message: user_message(failed.category).to_string(),
        }
    }

    /// Build the record without emitting it
    pub fn record_for(&self, failed: &FailedInvocation) -> DiagnosticRecord {
        DiagnosticRecord {
            id: Uuid::new_v4(),
            category: failed.category,
            resolution: failed.resolution,
            attempt_count: failed.attempt_count,
            service_id: failed.service_id.clone(),
            operation: failed.operation.clone(),
            timestamp: Utc::now(),
            redacted_input: self.redactor.redact_value(&failed.input),
            last_failure: failed
                .last_failure
                .as_ref()
                .map(|signal| self.redactor.redact_str(&signal.to_string())),
        }
    }
}
