//! Integration tests for calculator invocations

use super::*;
use integrations_remote_tool::ErrorCategory;
use serde_json::json;
use wiremock::matchers::body_json;

#[tokio::test]
async fn test_evaluate_integration_success() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .and(body_json(json!({"expression": "2 + 3"})))
        .respond_with(result_response(5.0))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.evaluate("2 + 3").await;

    assert_eq!(outcome.value(), Some(&5.0));
}

#[tokio::test]
async fn test_divide_by_zero_is_validation() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .respond_with(detail_response(400, "Division by zero"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.divide(1.0, 0.0).await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Validation));
    assert!(!outcome.user_message().unwrap().contains("Division"));
}

#[tokio::test]
async fn test_malformed_expression_is_not_retried() {
    let mock_server = setup_mock_server().await;

    calculate_with_auth()
        .respond_with(detail_response(422, "Invalid expression: 2 +"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.evaluate("2 + ").await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Validation));
}

#[tokio::test]
async fn test_blank_expression_makes_no_request() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(result_response(0.0))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.evaluate("").await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Validation));
}

#[tokio::test]
async fn test_authentication_error_is_fatal() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/calculate"))
        .respond_with(detail_response(401, "Invalid API key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));
    let outcome = client.add(1.0, 2.0).await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Fatal));
}

#[tokio::test]
async fn test_empty_credential_is_fatal_without_request() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(result_response(3.0))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server);
    config.api_key = Some(SecretString::new(String::new()));
    let client = test_client(config);

    let outcome = client.add(1.0, 2.0).await;

    assert_eq!(outcome.category(), Some(ErrorCategory::Fatal));
}

#[tokio::test]
async fn test_health_check_integration() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));

    let first = client.health().await;
    let second = client.health().await;

    assert!(first.healthy);
    assert!(second.healthy);
}

#[tokio::test]
async fn test_degraded_health_status() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
        .mount(&mock_server)
        .await;

    let client = test_client(test_config(&mock_server));

    assert!(!client.health().await.healthy);
}
