//! Test fixtures and helper data.

use crate::errors::FailureSignal;
use crate::resilience::{CircuitBreakerConfig, ConstantBackoff, ResilienceConfig, RetryConfig};
use crate::types::InvocationRequest;
use http::StatusCode;
use serde_json::json;
use std::time::Duration;

/// Dependency id used across tests
pub const TEST_SERVICE_ID: &str = "calculator";

/// Sample credential for testing
pub const TEST_API_KEY: &str = "tool-test-key-0123456789";

/// Backoff short enough to keep tests fast but still observable
pub const TEST_BACKOFF: Duration = Duration::from_millis(5);

/// A `calculate` request for `expression`
pub fn calculate_request(expression: &str) -> InvocationRequest {
    InvocationRequest::new("calculate", json!({ "expression": expression }))
}

/// Default resilience settings with a tiny constant backoff
pub fn no_wait_config() -> ResilienceConfig {
    ResilienceConfig {
        retry: RetryConfig::default().with_backoff(ConstantBackoff(TEST_BACKOFF)),
        ..Default::default()
    }
}

/// Tiny backoff with the given breaker threshold and cooldown
pub fn breaker_config(threshold: u32, cooldown: Duration) -> ResilienceConfig {
    ResilienceConfig {
        circuit_breaker: CircuitBreakerConfig::default()
            .with_failure_threshold(threshold)
            .with_cooldown(cooldown),
        ..no_wait_config()
    }
}

/// 503 from the service
pub fn service_unavailable() -> FailureSignal {
    FailureSignal::from_status(StatusCode::SERVICE_UNAVAILABLE, Some("Service Unavailable".to_string()))
}

/// 400 rejection of a malformed expression, as the calculator reports it
pub fn invalid_expression(expression: &str) -> FailureSignal {
    FailureSignal::from_status(
        StatusCode::BAD_REQUEST,
        Some(format!("Invalid expression: {}", expression.trim())),
    )
}

/// Successful calculator response body
pub fn calculation_result(value: f64) -> serde_json::Value {
    json!({ "result": value })
}
