//! Integration tests for retry and circuit breaking over HTTP

use super::*;
use integrations_remote_tool::{CircuitState, ErrorCategory};

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.evaluate("2 + 3").await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Transient));
    assert!(!outcome.user_message().unwrap().contains("Unavailable"));
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    calculate_with_auth()
        .respond_with(result_response(42.0))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.multiply(6.0, 7.0).await;

    assert_eq!(outcome.value(), Some(&42.0));
}

#[tokio::test]
async fn test_invalid_json_is_transient() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.evaluate("1 + 1").await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Transient));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .respond_with(result_response(1.0).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let config = RemoteToolConfig {
        timeout: Duration::from_millis(50),
        max_retries: 0,
        ..test_config(&mock_server)
    };
    let client = test_client(config);
    let outcome = client.evaluate("1").await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Transient));
}

#[tokio::test]
async fn test_circuit_opens_and_stops_requests() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));

    client.evaluate("1 + 1").await;
    assert_eq!(client.circuit_state(), CircuitState::Open);

    let outcome = client.evaluate("1 + 1").await;
    assert_eq!(outcome.category(), Some(ErrorCategory::Transient));
}

#[tokio::test]
async fn test_unreachable_service_is_transient() {
    let config = RemoteToolConfig::builder()
        .base_url("http://127.0.0.1:1")
        .backoff(Duration::from_millis(1))
        .max_retries(1)
        .build()
        .unwrap();
    let client = test_client(config);

    let outcome = client.evaluate("1 + 1").await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Transient));
    assert!(!client.health().await.healthy);
}

#[tokio::test]
async fn test_preflight_blocks_unhealthy_service() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    calculate_with_auth()
        .respond_with(result_response(2.0))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = RemoteToolConfig {
        preflight_health_check: true,
        ..test_config(&mock_server)
    };
    let client = test_client(config);
    let outcome = client.evaluate("1 + 1").await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Transient));
}
