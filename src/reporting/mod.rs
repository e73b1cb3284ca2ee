//! Structured error reporting.
//!
//! Every failed invocation yields a fixed, user-safe message for its category
//! and one [`DiagnosticRecord`] for operators, with credentials masked by a
//! [`Redactor`].

mod redaction;
mod reporter;

pub use redaction::{Redactor, REDACTED, SENSITIVE_KEY_FRAGMENTS};
pub use reporter::{
    user_message, DiagnosticRecord, DiagnosticSink, ErrorReporter, FailedInvocation, InMemoryDiagnosticSink,
    TracingDiagnosticSink,
};
