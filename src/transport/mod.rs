//! Boundaries to the remote dependency.
//!
//! The orchestrator only sees [`RemoteService`] and [`HealthPing`];
//! [`HttpRemoteService`] implements both over HTTP.

mod http_service;

pub use http_service::HttpRemoteService;

use crate::errors::FailureSignal;
use crate::types::InvocationRequest;
use async_trait::async_trait;

/// One attempt against a remote dependency.
///
/// Implementations report failures as raw [`FailureSignal`]s and leave
/// classification, retry and circuit breaking to the orchestrator.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Perform the remote operation once
    async fn call(&self, request: &InvocationRequest) -> Result<serde_json::Value, FailureSignal>;
}

/// Liveness check for a remote dependency.
#[async_trait]
pub trait HealthPing: Send + Sync {
    /// Returns true if `service_id` answered its liveness check
    async fn ping(&self, service_id: &str) -> bool;
}

/// Liveness check that always succeeds.
///
/// Used when no real check is available; the health cache is then fed only
/// by observations from invocation attempts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeHealthy;

#[async_trait]
impl HealthPing for AssumeHealthy {
    async fn ping(&self, _service_id: &str) -> bool {
        true
    }
}
