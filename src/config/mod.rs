//! Configuration for a remote tool client.

use crate::errors::{RemoteToolError, RemoteToolResult};
use crate::resilience::{
    BreakerPolicy, CircuitBreakerConfig, ConstantBackoff, HealthConfig, ResilienceConfig, RetryConfig,
};
use crate::{
    DEFAULT_BACKOFF_MILLIS, DEFAULT_BASE_URL, DEFAULT_CIRCUIT_COOLDOWN_SECS, DEFAULT_CIRCUIT_THRESHOLD,
    DEFAULT_HEALTH_PATH, DEFAULT_HEALTH_TTL_SECS, DEFAULT_INVOKE_PATH, DEFAULT_MAX_RETRIES,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_SERVICE_ID, DEFAULT_TIMEOUT_SECS,
};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// Configuration for one remote tool dependency.
#[derive(Clone, Debug)]
pub struct RemoteToolConfig {
    /// Base URL of the remote service
    pub base_url: Url,
    /// Dependency id used for breaker and health-cache keys
    pub service_id: String,
    /// Path of the invocation endpoint
    pub invoke_path: String,
    /// Path of the liveness endpoint
    pub health_path: String,
    /// Optional bearer credential
    pub api_key: Option<SecretString>,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Liveness check timeout
    pub probe_timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Constant wait between attempts
    pub backoff: Duration,
    /// Consecutive transient failures that open the circuit
    pub circuit_threshold: u32,
    /// Time the circuit stays open
    pub circuit_cooldown: Duration,
    /// Lifetime of a cached health result
    pub health_ttl: Duration,
    /// Probe health before the first attempt of every invocation
    pub preflight_health_check: bool,
}

impl RemoteToolConfig {
    /// Creates a new configuration builder
    pub fn builder() -> RemoteToolConfigBuilder {
        RemoteToolConfigBuilder::default()
    }

    /// Creates a configuration from `REMOTE_TOOL_*` environment variables.
    ///
    /// Unset or unparsable numeric values fall back to their defaults; an
    /// unparsable base URL is an error.
    pub fn from_env() -> RemoteToolResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> RemoteToolResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |name: &str| lookup(name).and_then(|s| s.trim().parse::<u64>().ok()).map(Duration::from_secs);
        let number = |name: &str| lookup(name).and_then(|s| s.trim().parse::<u32>().ok());

        let mut builder = Self::builder();
        if let Some(base_url) = lookup("REMOTE_TOOL_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Some(service_id) = lookup("REMOTE_TOOL_SERVICE_ID") {
            builder = builder.service_id(service_id);
        }
        if let Some(path) = lookup("REMOTE_TOOL_INVOKE_PATH") {
            builder = builder.invoke_path(path);
        }
        if let Some(path) = lookup("REMOTE_TOOL_HEALTH_PATH") {
            builder = builder.health_path(path);
        }
        if let Some(api_key) = lookup("REMOTE_TOOL_API_KEY") {
            builder = builder.api_key(SecretString::new(api_key));
        }
        if let Some(timeout) = secs("REMOTE_TOOL_TIMEOUT_SECS") {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = secs("REMOTE_TOOL_PROBE_TIMEOUT_SECS") {
            builder = builder.probe_timeout(timeout);
        }
        if let Some(max_retries) = number("REMOTE_TOOL_MAX_RETRIES") {
            builder = builder.max_retries(max_retries);
        }
        if let Some(millis) = lookup("REMOTE_TOOL_BACKOFF_MS").and_then(|s| s.trim().parse::<u64>().ok()) {
            builder = builder.backoff(Duration::from_millis(millis));
        }
        if let Some(threshold) = number("REMOTE_TOOL_CIRCUIT_THRESHOLD") {
            builder = builder.circuit_threshold(threshold);
        }
        if let Some(cooldown) = secs("REMOTE_TOOL_CIRCUIT_COOLDOWN_SECS") {
            builder = builder.circuit_cooldown(cooldown);
        }
        if let Some(ttl) = secs("REMOTE_TOOL_HEALTH_TTL_SECS") {
            builder = builder.health_ttl(ttl);
        }
        if let Some(flag) = lookup("REMOTE_TOOL_PREFLIGHT_HEALTH_CHECK") {
            builder = builder.preflight_health_check(matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ));
        }

        builder.build()
    }

    /// Full URL of the invocation endpoint, under any path prefix of `base_url`
    pub fn invoke_url(&self) -> RemoteToolResult<Url> {
        endpoint_url(&self.base_url, &self.invoke_path)
    }

    /// Full URL of the liveness endpoint, under any path prefix of `base_url`
    pub fn health_url(&self) -> RemoteToolResult<Url> {
        endpoint_url(&self.base_url, &self.health_path)
    }

    /// Resilience settings derived from this configuration
    pub fn resilience_config(&self) -> ResilienceConfig {
        ResilienceConfig {
            retry: RetryConfig::default()
                .with_max_retries(self.max_retries)
                .with_backoff(ConstantBackoff(self.backoff)),
            circuit_breaker: CircuitBreakerConfig::default()
                .with_failure_threshold(self.circuit_threshold)
                .with_cooldown(self.circuit_cooldown),
            health: HealthConfig {
                ttl: self.health_ttl,
                probe_timeout: self.probe_timeout,
            },
            breaker_policy: BreakerPolicy::default(),
            preflight_health_check: self.preflight_health_check,
            attempt_timeout: self.timeout,
        }
    }
}

// Endpoint paths are relative to the base path, so a leading `/` is ignored
fn endpoint_url(base_url: &Url, path: &str) -> RemoteToolResult<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Builder for RemoteToolConfig
#[derive(Default)]
pub struct RemoteToolConfigBuilder {
    base_url: Option<String>,
    service_id: Option<String>,
    invoke_path: Option<String>,
    health_path: Option<String>,
    api_key: Option<SecretString>,
    timeout: Option<Duration>,
    probe_timeout: Option<Duration>,
    max_retries: Option<u32>,
    backoff: Option<Duration>,
    circuit_threshold: Option<u32>,
    circuit_cooldown: Option<Duration>,
    health_ttl: Option<Duration>,
    preflight_health_check: bool,
}

impl RemoteToolConfigBuilder {
    /// Sets the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the dependency id
    pub fn service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    /// Sets the invocation endpoint path
    pub fn invoke_path(mut self, path: impl Into<String>) -> Self {
        self.invoke_path = Some(path.into());
        self
    }

    /// Sets the liveness endpoint path
    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = Some(path.into());
        self
    }

    /// Sets the bearer credential
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the liveness check timeout
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of retries
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the constant wait between attempts
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Sets the circuit failure threshold
    pub fn circuit_threshold(mut self, threshold: u32) -> Self {
        self.circuit_threshold = Some(threshold);
        self
    }

    /// Sets the circuit cooldown
    pub fn circuit_cooldown(mut self, cooldown: Duration) -> Self {
        self.circuit_cooldown = Some(cooldown);
        self
    }

    /// Sets the health result lifetime
    pub fn health_ttl(mut self, ttl: Duration) -> Self {
        self.health_ttl = Some(ttl);
        self
    }

    /// Enables or disables the pre-flight health check
    pub fn preflight_health_check(mut self, enabled: bool) -> Self {
        self.preflight_health_check = enabled;
        self
    }

    /// Builds the configuration
    pub fn build(self) -> RemoteToolResult<RemoteToolConfig> {
        let raw_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|e| RemoteToolError::Configuration {
            message: format!("Invalid base URL '{}': {}", raw_url, e),
        })?;

        let service_id = self.service_id.unwrap_or_else(|| DEFAULT_SERVICE_ID.to_string());
        if service_id.trim().is_empty() {
            return Err(RemoteToolError::Configuration {
                message: "Service id cannot be empty".to_string(),
            });
        }

        let timeout = self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(RemoteToolError::Configuration {
                message: "Timeout must be greater than zero".to_string(),
            });
        }

        let circuit_threshold = self.circuit_threshold.unwrap_or(DEFAULT_CIRCUIT_THRESHOLD);
        if circuit_threshold == 0 {
            return Err(RemoteToolError::Configuration {
                message: "Circuit threshold must be at least 1".to_string(),
            });
        }

        Ok(RemoteToolConfig {
            base_url,
            service_id,
            invoke_path: self.invoke_path.unwrap_or_else(|| DEFAULT_INVOKE_PATH.to_string()),
            health_path: self.health_path.unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string()),
            api_key: self.api_key,
            timeout,
            probe_timeout: self
                .probe_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            backoff: self.backoff.unwrap_or(Duration::from_millis(DEFAULT_BACKOFF_MILLIS)),
            circuit_threshold,
            circuit_cooldown: self
                .circuit_cooldown
                .unwrap_or(Duration::from_secs(DEFAULT_CIRCUIT_COOLDOWN_SECS)),
            health_ttl: self.health_ttl.unwrap_or(Duration::from_secs(DEFAULT_HEALTH_TTL_SECS)),
            preflight_health_check: self.preflight_health_check,
        })
    }
}
