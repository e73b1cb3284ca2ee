//! # Remote Tool Client
//!
//! Resilient invocation layer for remote tool services, such as the
//! calculator an assistant delegates arithmetic to.
//!
//! ## Features
//!
//! - Failure classification into Validation, Transient and Fatal categories
//! - Bounded retry with pluggable backoff (constant, exponential, closure)
//! - Per-dependency circuit breaker with a single half-open trial
//! - TTL-cached, single-flight health probing
//! - Structured diagnostic records with credential redaction
//! - Observability (tracing, logging, metrics)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_remote_tool::{create_client, RemoteToolConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteToolConfig::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!
//!     let client = create_client(config)?;
//!
//!     match client.evaluate("2 + 3").await.into_result() {
//!         Ok(value) => println!("2 + 3 = {}", value),
//!         Err(failure) => println!("{}", failure.user_message),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Client facade and factory functions
//! - `config` - Configuration types and builder
//! - `errors` - Failure taxonomy, classifier and crate errors
//! - `resilience` - Circuit breaker, retry, health cache and orchestrator
//! - `reporting` - User messages and diagnostic records
//! - `transport` - Remote service seam and the HTTP adapter
//! - `types` - Requests and outcomes
//! - `mocks` - Mock implementations for testing
//! - `fixtures` - Test fixtures and helper data

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod reporting;
pub mod resilience;
pub mod transport;
pub mod types;

// Development/testing modules
#[cfg(test)]
pub mod mocks;
#[cfg(test)]
pub mod fixtures;

// Re-exports for convenience
pub use client::{create_client, create_client_from_env, RemoteToolClient};
pub use config::{RemoteToolConfig, RemoteToolConfigBuilder};
pub use errors::{
    DefaultFailureClassifier, ErrorCategory, FailureClassifier, FailureKind, FailureSignal, RemoteToolError,
    RemoteToolResult,
};
pub use observability::{
    InMemoryMetricsCollector, LogFormat, LogLevel, LoggingConfig, MetricsCollector, NoopMetricsCollector,
};
pub use reporting::{DiagnosticRecord, DiagnosticSink, ErrorReporter, Redactor, TracingDiagnosticSink};
pub use resilience::{
    BackoffPolicy, BreakerPolicy, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState,
    ConstantBackoff, DefaultResilienceOrchestrator, ExponentialBackoff, HealthProbeCache, InvokeOptions,
    ResilienceConfig, ResilienceOrchestrator, RetryConfig,
};
pub use transport::{HealthPing, HttpRemoteService, RemoteService};
pub use types::{FailureResolution, InvocationFailure, InvocationRequest, Outcome};

/// The default remote tool base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// The default dependency id
pub const DEFAULT_SERVICE_ID: &str = "calculator";

/// The default invocation path
pub const DEFAULT_INVOKE_PATH: &str = "/calculate";

/// The default liveness path
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// The default per-attempt timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// The default liveness check timeout
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 2;

/// The default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// The default constant wait between attempts
pub const DEFAULT_BACKOFF_MILLIS: u64 = 1000;

/// The default consecutive-failure threshold for opening the circuit
pub const DEFAULT_CIRCUIT_THRESHOLD: u32 = 3;

/// The default time the circuit stays open
pub const DEFAULT_CIRCUIT_COOLDOWN_SECS: u64 = 30;

/// The default lifetime of a cached health result
pub const DEFAULT_HEALTH_TTL_SECS: u64 = 5;
