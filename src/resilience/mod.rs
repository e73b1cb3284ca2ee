//! Resilience patterns for remote tool invocation.
//!
//! A [`DefaultResilienceOrchestrator`] drives each invocation through a shared
//! per-dependency [`CircuitBreaker`], a bounded retry loop paced by a
//! [`BackoffPolicy`], and a TTL-cached [`HealthProbeCache`].

mod circuit_breaker;
mod health;
mod orchestrator;
mod registry;
mod retry;


pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerHook, CircuitOpen, CircuitPermit, CircuitSnapshot,
    CircuitState,
};
pub use health::{HealthConfig, HealthProbeCache, HealthProbeResult, HealthStatus};
pub use orchestrator::{
    BreakerPolicy, DefaultResilienceOrchestrator, InvokeOptions, ResilienceConfig, ResilienceOrchestrator,
    ResilienceOrchestratorBuilder,
};
pub use registry::CircuitBreakerRegistry;
pub use retry::{
    backoff_fn, BackoffPolicy, ConstantBackoff, ExponentialBackoff, FnBackoff, RetryConfig, RetryContext,
    RetryDecision, RetryHook,
};
