//! Client interface for a remote tool.
//!
//! Wires configuration, the HTTP adapter and the resilience orchestrator
//! together, and offers calculator helpers on top.

use crate::config::RemoteToolConfig;
use crate::errors::{FailureSignal, RemoteToolResult};
use crate::resilience::{
    CircuitBreakerRegistry, CircuitState, DefaultResilienceOrchestrator, HealthProbeResult, InvokeOptions,
    ResilienceOrchestrator,
};
use crate::transport::HttpRemoteService;
use crate::types::{InvocationRequest, Outcome};
use serde_json::{json, Value};
use std::sync::Arc;

/// Operation name used for calculator requests
pub const CALCULATE_OPERATION: &str = "calculate";

/// Resilient client for one remote tool
pub struct RemoteToolClient {
    config: Arc<RemoteToolConfig>,
    orchestrator: DefaultResilienceOrchestrator,
}

impl RemoteToolClient {
    /// Create a client whose breaker lives in the process-wide registry
    pub fn new(config: RemoteToolConfig) -> RemoteToolResult<Self> {
        Self::with_registry(config, CircuitBreakerRegistry::global())
    }

    /// Create a client whose breaker lives in `registry`
    pub fn with_registry(config: RemoteToolConfig, registry: Arc<CircuitBreakerRegistry>) -> RemoteToolResult<Self> {
        let service = Arc::new(HttpRemoteService::new(&config)?);
        let orchestrator = DefaultResilienceOrchestrator::builder(config.service_id.clone(), service.clone())
            .config(config.resilience_config())
            .registry(registry)
            .health_ping(service)
            .build();

        Ok(Self::from_parts(config, orchestrator))
    }

    /// Create a client around an already configured orchestrator
    pub fn from_parts(config: RemoteToolConfig, orchestrator: DefaultResilienceOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &RemoteToolConfig {
        &self.config
    }

    /// Get the orchestrator
    pub fn orchestrator(&self) -> &DefaultResilienceOrchestrator {
        &self.orchestrator
    }

    /// Invoke an arbitrary operation
    pub async fn invoke(&self, request: &InvocationRequest) -> Outcome<Value> {
        self.orchestrator.invoke(request).await
    }

    /// Evaluate an arithmetic expression remotely.
    ///
    /// A blank expression is rejected as Validation without contacting the
    /// service. A response without a numeric `result` counts as a failed
    /// attempt.
    pub async fn evaluate(&self, expression: &str) -> Outcome<f64> {
        let request = InvocationRequest::new(CALCULATE_OPERATION, json!({ "expression": expression }));

        if expression.trim().is_empty() {
            return self
                .orchestrator
                .reject(&request, FailureSignal::malformed_input("expression is empty"));
        }

        self.orchestrator
            .invoke_decoded(&request, InvokeOptions::default(), decode_result)
            .await
    }

    /// Add two numbers
    pub async fn add(&self, a: f64, b: f64) -> Outcome<f64> {
        self.evaluate(&format!("{} + {}", a, b)).await
    }

    /// Subtract `b` from `a`
    pub async fn subtract(&self, a: f64, b: f64) -> Outcome<f64> {
        self.evaluate(&format!("{} - {}", a, b)).await
    }

    /// Multiply two numbers
    pub async fn multiply(&self, a: f64, b: f64) -> Outcome<f64> {
        self.evaluate(&format!("{} * {}", a, b)).await
    }

    /// Divide `a` by `b`; division by zero is left to the service
    pub async fn divide(&self, a: f64, b: f64) -> Outcome<f64> {
        self.evaluate(&format!("{} / {}", a, b)).await
    }

    /// Liveness of the service, served from cache while fresh
    pub async fn health(&self) -> HealthProbeResult {
        self.orchestrator.health().probe(&self.config.service_id).await
    }

    /// Current breaker state for this service
    pub fn circuit_state(&self) -> CircuitState {
        self.orchestrator.circuit_breaker().state()
    }
}

fn decode_result(body: Value) -> Result<f64, FailureSignal> {
    body.get("result")
        .and_then(Value::as_f64)
        .ok_or_else(|| FailureSignal::decode("response has no numeric result"))
}

/// Create a new client from configuration
pub fn create_client(config: RemoteToolConfig) -> RemoteToolResult<RemoteToolClient> {
    RemoteToolClient::new(config)
}

/// Create a new client from `REMOTE_TOOL_*` environment variables
pub fn create_client_from_env() -> RemoteToolResult<RemoteToolClient> {
    let config = RemoteToolConfig::from_env()?;
    create_client(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;
    use crate::fixtures::{calculation_result, invalid_expression, no_wait_config};
    use crate::mocks::ScriptedRemoteService;
    use crate::reporting::{ErrorReporter, InMemoryDiagnosticSink};
    use crate::types::FailureResolution;

    fn client(service: Arc<ScriptedRemoteService>) -> (RemoteToolClient, Arc<InMemoryDiagnosticSink>) {
        let sink = Arc::new(InMemoryDiagnosticSink::new());
        let orchestrator = DefaultResilienceOrchestrator::builder("calculator", service)
            .config(no_wait_config())
            .registry(Arc::new(CircuitBreakerRegistry::new()))
            .reporter(ErrorReporter::new(sink.clone()))
            .build();
        let config = RemoteToolConfig::builder().build().unwrap();
        (RemoteToolClient::from_parts(config, orchestrator), sink)
    }

    #[test]
    fn test_create_client() {
        let config = RemoteToolConfig::builder()
            .service_id("client-create-check")
            .build()
            .unwrap();

        let client = create_client(config).unwrap();
        assert_eq!(client.circuit_state(), CircuitState::Closed);
        assert_eq!(client.orchestrator().service_id(), "client-create-check");
    }

    #[tokio::test]
    async fn test_evaluate_decodes_result() {
        let service = Arc::new(ScriptedRemoteService::always_ok(calculation_result(5.0)));
        let (client, _) = client(service.clone());

        let outcome = client.evaluate("2 + 3").await;

        assert_eq!(outcome.value(), Some(&5.0));
        let requests = service.requests();
        assert_eq!(requests[0].operation, CALCULATE_OPERATION);
        assert_eq!(requests[0].payload, json!({"expression": "2 + 3"}));
    }

    #[tokio::test]
    async fn test_blank_expression_is_rejected_locally() {
        let service = Arc::new(ScriptedRemoteService::always_ok(calculation_result(0.0)));
        let (client, sink) = client(service.clone());

        let outcome = client.evaluate("   ").await;

        assert_eq!(outcome.category(), Some(ErrorCategory::Validation));
        assert_eq!(service.call_count(), 0);
        let record = sink.last().unwrap();
        assert_eq!(record.resolution, FailureResolution::NonRetryable);
        assert_eq!(record.attempt_count, 0);
    }

    #[tokio::test]
    async fn test_server_validation_error() {
        let service = Arc::new(ScriptedRemoteService::always_err(invalid_expression("2 + ")));
        let (client, _) = client(service.clone());

        let outcome = client.evaluate("2 + ").await;

        assert_eq!(outcome.category(), Some(ErrorCategory::Validation));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_result_is_retried() {
        let service = Arc::new(ScriptedRemoteService::new(vec![
            Ok(json!({"answer": 6})),
            Ok(calculation_result(6.0)),
        ]));
        let (client, _) = client(service.clone());

        let outcome = client.multiply(2.0, 3.0).await;

        assert_eq!(outcome.value(), Some(&6.0));
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_arithmetic_helpers_build_expressions() {
        let service = Arc::new(ScriptedRemoteService::always_ok(calculation_result(1.0)));
        let (client, _) = client(service.clone());

        client.add(1.0, 2.5).await;
        client.subtract(4.0, 1.0).await;
        client.multiply(2.0, 3.0).await;
        client.divide(9.0, 3.0).await;

        let expressions: Vec<Value> = service
            .requests()
            .into_iter()
            .map(|r| r.payload["expression"].clone())
            .collect();
        assert_eq!(
            expressions,
            vec![json!("1 + 2.5"), json!("4 - 1"), json!("2 * 3"), json!("9 / 3")]
        );
    }

    #[test]
    fn test_decode_result() {
        assert_eq!(decode_result(json!({"result": 2})).unwrap(), 2.0);
        assert!(decode_result(json!({"result": "two"})).is_err());
        assert!(decode_result(json!({})).is_err());
    }
}
