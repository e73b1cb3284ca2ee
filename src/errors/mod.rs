//! Error types for the remote tool layer.
//!
//! Two families live here:
//!
//! - [`RemoteToolError`]: crate-level errors raised while building clients or
//!   parsing configuration.
//! - [`FailureSignal`] / [`ErrorCategory`]: the per-attempt failure taxonomy
//!   consumed by the retry orchestrator, plus the [`FailureClassifier`] that maps
//!   one onto the other.

mod categories;
mod classifier;
mod error;

pub use categories::{ErrorCategory, FailureKind, FailureSignal, StatusClass};
pub use classifier::{DefaultFailureClassifier, FailureClassifier};
pub use error::{RemoteToolError, RemoteToolResult};
