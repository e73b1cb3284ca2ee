//! HTTP adapter for a JSON tool service.

use super::{HealthPing, RemoteService};
use crate::config::RemoteToolConfig;
use crate::errors::{FailureSignal, RemoteToolResult};
use crate::observability::log_response;
use crate::types::InvocationRequest;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

/// Invokes a tool service with `POST {base_url}{invoke_path}` and checks its
/// liveness with `GET {base_url}{health_path}`.
pub struct HttpRemoteService {
    client: Client,
    service_id: String,
    invoke_url: Url,
    health_url: Url,
    api_key: Option<SecretString>,
    probe_timeout: Duration,
}

impl HttpRemoteService {
    /// Create an adapter from configuration
    pub fn new(config: &RemoteToolConfig) -> RemoteToolResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            service_id: config.service_id.clone(),
            invoke_url: config.invoke_url()?,
            health_url: config.health_url()?,
            api_key: config.api_key.clone(),
            probe_timeout: config.probe_timeout,
        })
    }

    /// URL invocations are posted to
    pub fn invoke_url(&self) -> &Url {
        &self.invoke_url
    }

    /// URL of the liveness check
    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    fn map_send_error(error: reqwest::Error) -> FailureSignal {
        if error.is_timeout() {
            FailureSignal::timeout()
        } else if error.is_connect() {
            let message = error.to_string();
            if is_dns_failure(&error) {
                FailureSignal::dns(message)
            } else {
                FailureSignal::connection_refused(message)
            }
        } else if error.is_builder() {
            FailureSignal::misconfigured(error.to_string())
        } else if error.is_decode() || error.is_body() {
            FailureSignal::decode(error.to_string())
        } else {
            FailureSignal::other(error.to_string())
        }
    }

    fn map_http_error(status: StatusCode, body: &str) -> FailureSignal {
        let detail = if status.is_client_error() {
            // FastAPI-style services put the reason in `detail`
            serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|value| match value.get("detail") {
                    Some(Value::String(detail)) => Some(detail.clone()),
                    Some(other) => Some(other.to_string()),
                    None => None,
                })
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        } else {
            (!body.trim().is_empty()).then(|| body.trim().to_string())
        };

        FailureSignal::from_status(status, detail)
    }
}

/// Returns true if any error in the source chain reports a name resolution failure.
///
/// reqwest's own message omits its sources; hyper reports resolver failures
/// as `dns error: ...` further down the chain.
fn is_dns_failure(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        let message = err.to_string().to_ascii_lowercase();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        current = err.source();
    }
    false
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn call(&self, request: &InvocationRequest) -> Result<Value, FailureSignal> {
        let mut builder = self.client.post(self.invoke_url.clone()).json(&request.payload);

        if let Some(api_key) = &self.api_key {
            let secret = api_key.expose_secret();
            if secret.trim().is_empty() {
                return Err(FailureSignal::missing_credential());
            }
            builder = builder.bearer_auth(secret);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(Self::map_send_error)?;
        let status = response.status();
        let body = response.text().await.map_err(Self::map_send_error)?;
        log_response(
            &self.service_id,
            status.as_u16(),
            started.elapsed().as_millis() as u64,
            Some(&body),
        );

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| FailureSignal::decode(format!("Response is not valid JSON: {}", e)))
    }
}

/// Healthy iff the endpoint answers 2xx and any JSON `status` field reads
/// `"healthy"`. A 2xx with a non-JSON body or no `status` field also counts as
/// healthy, which is more lenient than checking for `status == "healthy"` alone.
#[async_trait]
impl HealthPing for HttpRemoteService {
    async fn ping(&self, _service_id: &str) -> bool {
        let response = match self
            .client
            .get(self.health_url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            _ => return false,
        };

        match response.json::<Value>().await {
            Ok(body) => body
                .get("status")
                .and_then(Value::as_str)
                .map_or(true, |status| status == "healthy"),
            Err(_) => true,
        }
    }
}
