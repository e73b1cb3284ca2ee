//! Integration tests using WireMock
//!
//! These tests drive the client against a mock calculator service over real
//! HTTP, covering serialization, authentication, classification and the
//! resilience layer end to end.

mod calculator;
mod resilience;

use integrations_remote_tool::{CircuitBreakerRegistry, RemoteToolClient, RemoteToolConfig};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Credential the mock server expects
pub const TEST_API_KEY: &str = "test-api-key";

/// Helper to create a mock server
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Configuration pointing at `server` with millisecond backoff
pub fn test_config(server: &MockServer) -> RemoteToolConfig {
    RemoteToolConfig::builder()
        .base_url(server.uri())
        .api_key(SecretString::new(TEST_API_KEY.to_string()))
        .backoff(Duration::from_millis(1))
        .build()
        .expect("Failed to build config")
}

/// Client with its own breaker registry so tests do not share state
pub fn test_client(config: RemoteToolConfig) -> RemoteToolClient {
    RemoteToolClient::with_registry(config, Arc::new(CircuitBreakerRegistry::new()))
        .expect("Failed to build client")
}

/// Helper to create an authenticated calculate matcher
pub fn calculate_with_auth() -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/calculate"))
        .and(header("Authorization", "Bearer test-api-key"))
}

/// Helper to create success response templates
pub fn result_response(value: f64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": value }))
}

/// Helper to create error response templates
pub fn detail_response(status: u16, detail: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({ "detail": detail }))
}
