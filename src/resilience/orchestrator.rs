use crate::errors::{DefaultFailureClassifier, ErrorCategory, FailureClassifier, FailureSignal};
use crate::observability::{log_attempt, metric_names, MetricsCollector, NoopMetricsCollector};
use crate::reporting::{ErrorReporter, FailedInvocation};
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::resilience::health::{HealthConfig, HealthProbeCache};
use crate::resilience::registry::CircuitBreakerRegistry;
use crate::resilience::retry::{BackoffPolicy, RetryConfig, RetryContext, RetryDecision, RetryHook};
use crate::transport::{AssumeHealthy, HealthPing, RemoteService};
use crate::types::{FailureResolution, InvocationRequest, Outcome};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs a remote invocation through admission control, bounded retry and
/// failure reporting.
#[async_trait]
pub trait ResilienceOrchestrator: Send + Sync {
    /// Invoke with the configured retry settings
    async fn invoke(&self, request: &InvocationRequest) -> Outcome<Value> {
        self.invoke_with(request, InvokeOptions::default()).await
    }

    /// Invoke with per-call overrides
    async fn invoke_with(&self, request: &InvocationRequest, options: InvokeOptions) -> Outcome<Value>;
}

/// Which classified failures count against the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakerPolicy {
    /// Only Transient failures count; Validation and Fatal leave the breaker untouched
    #[default]
    TransientOnly,
    /// Every failure counts
    AllFailures,
}

/// Configuration for resilience behavior
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Retry limit and backoff
    pub retry: RetryConfig,
    /// Breaker threshold and cooldown
    pub circuit_breaker: CircuitBreakerConfig,
    /// Health cache TTL and probe timeout
    pub health: HealthConfig,
    /// Which failures feed the breaker
    pub breaker_policy: BreakerPolicy,
    /// Probe health before the first attempt
    pub preflight_health_check: bool,
    /// Upper bound on one remote attempt
    pub attempt_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            health: HealthConfig::default(),
            breaker_policy: BreakerPolicy::default(),
            preflight_health_check: false,
            attempt_timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ResilienceConfig {
    /// No retries and a breaker that never opens
    pub fn passthrough() -> Self {
        Self {
            retry: RetryConfig::no_retry(),
            circuit_breaker: CircuitBreakerConfig::default().with_failure_threshold(u32::MAX),
            ..Default::default()
        }
    }
}

/// Per-call overrides for [`ResilienceOrchestrator::invoke_with`].
#[derive(Clone, Default)]
pub struct InvokeOptions {
    /// Overrides the configured retry limit
    pub max_retries: Option<u32>,
    /// Overrides the configured backoff policy
    pub backoff: Option<Arc<dyn BackoffPolicy>>,
}

impl InvokeOptions {
    /// Override the retry limit
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Override the backoff policy
    pub fn with_backoff(mut self, backoff: impl BackoffPolicy + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }
}

/// Default implementation of resilience orchestrator for one dependency.
pub struct DefaultResilienceOrchestrator {
    service_id: String,
    service: Arc<dyn RemoteService>,
    config: ResilienceConfig,
    classifier: Arc<dyn FailureClassifier>,
    breaker: Arc<CircuitBreaker>,
    health: Arc<HealthProbeCache>,
    reporter: ErrorReporter,
    metrics: Arc<dyn MetricsCollector>,
    retry_hook: Option<Arc<dyn RetryHook>>,
}

impl DefaultResilienceOrchestrator {
    /// Create a builder for configuring the orchestrator
    pub fn builder(
        service_id: impl Into<String>,
        service: Arc<dyn RemoteService>,
    ) -> ResilienceOrchestratorBuilder {
        ResilienceOrchestratorBuilder::new(service_id, service)
    }

    /// Dependency id this orchestrator guards
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Active configuration
    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    /// Breaker shared by every caller of this dependency
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Health cache for this dependency
    pub fn health(&self) -> &HealthProbeCache {
        &self.health
    }

    /// Reporter used for failed outcomes
    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    /// Fail a request locally, without any remote attempt.
    ///
    /// The signal is classified and reported like a remote failure.
    pub fn reject<T>(&self, request: &InvocationRequest, signal: FailureSignal) -> Outcome<T> {
        let category = self.classifier.classify(&signal);
        self.fail(request, category, FailureResolution::NonRetryable, 0, Some(signal))
    }

    /// Invoke and decode the success value inside the attempt.
    ///
    /// A decode error is a failed attempt like any other and goes through
    /// classification, the breaker and retry.
    pub async fn invoke_decoded<T, F>(
        &self,
        request: &InvocationRequest,
        options: InvokeOptions,
        decode: F,
    ) -> Outcome<T>
    where
        T: Send,
        F: Fn(Value) -> Result<T, FailureSignal> + Send + Sync,
    {
        let labels = [("dependency", self.service_id.as_str())];
        let max_retries = options.max_retries.unwrap_or(self.config.retry.max_retries);
        let backoff = options
            .backoff
            .unwrap_or_else(|| self.config.retry.backoff.clone());
        let max_attempts = max_retries.saturating_add(1);

        self.metrics.increment_counter(metric_names::INVOCATIONS, 1, &labels);

        if self.config.preflight_health_check && !self.health.probe(&self.service_id).await.healthy {
            self.metrics
                .increment_counter(metric_names::HEALTH_PROBE_FAILURES, 1, &labels);
            return self.fail(request, ErrorCategory::Transient, FailureResolution::Unhealthy, 0, None);
        }

        let mut attempts_made = 0u32;
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            match self.breaker.try_acquire() {
                Err(rejection) => {
                    tracing::debug!(
                        dependency = %self.service_id,
                        operation = %request.operation,
                        attempt = attempt,
                        retry_after_ms = rejection.retry_after.map(|d| d.as_millis() as u64),
                        "Circuit open, attempt rejected"
                    );
                    self.metrics
                        .increment_counter(metric_names::CIRCUIT_REJECTIONS, 1, &labels);
                    return self.fail(
                        request,
                        ErrorCategory::Transient,
                        FailureResolution::CircuitOpen,
                        attempts_made,
                        last_failure,
                    );
                }
                Ok(permit) => {
                    attempts_made += 1;
                    log_attempt(&self.service_id, &request.operation, attempt);
                    self.metrics.increment_counter(metric_names::ATTEMPTS, 1, &labels);

                    let started = Instant::now();
                    let result = self.attempt(request).await.and_then(&decode);
                    self.metrics.record_histogram(
                        metric_names::ATTEMPT_DURATION_MS,
                        started.elapsed().as_millis() as f64,
                        &labels,
                    );

                    match result {
                        Ok(value) => {
                            permit.success();
                            self.health.record(&self.service_id, true);
                            self.record_breaker_state(&labels);
                            self.metrics.increment_counter(metric_names::SUCCESSES, 1, &labels);
                            return Outcome::Success(value);
                        }
                        Err(signal) => {
                            let category = self.classifier.classify(&signal);
                            tracing::debug!(
                                dependency = %self.service_id,
                                operation = %request.operation,
                                attempt = attempt,
                                category = %category,
                                failure = %signal,
                                "Attempt failed"
                            );

                            if category == ErrorCategory::Transient
                                || self.config.breaker_policy == BreakerPolicy::AllFailures
                            {
                                permit.failure();
                            } else {
                                permit.ignore();
                            }
                            self.record_breaker_state(&labels);

                            if !category.is_retryable() {
                                return self.fail(
                                    request,
                                    category,
                                    FailureResolution::NonRetryable,
                                    attempts_made,
                                    Some(signal),
                                );
                            }

                            self.health.record(&self.service_id, false);
                            last_failure = Some(signal);
                        }
                    }
                }
            }

            if attempt == max_attempts {
                break;
            }

            // Waiting out the backoff cannot help while the circuit rejects
            if self.breaker.is_open() {
                self.metrics
                    .increment_counter(metric_names::CIRCUIT_REJECTIONS, 1, &labels);
                return self.fail(
                    request,
                    ErrorCategory::Transient,
                    FailureResolution::CircuitOpen,
                    attempts_made,
                    last_failure,
                );
            }

            let mut delay = backoff.delay(attempt);
            if let Some(hook) = &self.retry_hook {
                let context = RetryContext {
                    attempt,
                    category: ErrorCategory::Transient,
                    delay,
                    operation: request.operation.clone(),
                    service_id: self.service_id.clone(),
                };
                match hook.on_retry(context).await {
                    RetryDecision::Default => {}
                    RetryDecision::Retry(custom) => delay = custom,
                    RetryDecision::Abort => {
                        tracing::debug!(dependency = %self.service_id, attempt = attempt, "Retry aborted by hook");
                        break;
                    }
                }
            }

            tracing::info!(
                dependency = %self.service_id,
                operation = %request.operation,
                attempt = attempt,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Retrying after transient failure"
            );
            self.metrics.increment_counter(metric_names::RETRIES, 1, &labels);
            tokio::time::sleep(delay).await;
        }

        self.fail(
            request,
            ErrorCategory::Transient,
            FailureResolution::RetriesExhausted,
            attempts_made,
            last_failure,
        )
    }

    async fn attempt(&self, request: &InvocationRequest) -> Result<Value, FailureSignal> {
        match tokio::time::timeout(self.config.attempt_timeout, self.service.call(request)).await {
            Ok(result) => result,
            Err(_) => Err(FailureSignal::timeout()),
        }
    }

    fn record_breaker_state(&self, labels: &[(&str, &str)]) {
        self.metrics.set_gauge(
            metric_names::CIRCUIT_BREAKER_STATE,
            self.breaker.state().as_gauge(),
            labels,
        );
    }

    fn fail<T>(
        &self,
        request: &InvocationRequest,
        category: ErrorCategory,
        resolution: FailureResolution,
        attempt_count: u32,
        last_failure: Option<FailureSignal>,
    ) -> Outcome<T> {
        self.metrics.increment_counter(
            metric_names::FAILURES,
            1,
            &[
                ("dependency", self.service_id.as_str()),
                ("category", category.as_str()),
                ("resolution", resolution.as_str()),
            ],
        );

        let failure = self.reporter.report(&FailedInvocation {
            category,
            resolution,
            attempt_count,
            service_id: self.service_id.clone(),
            operation: request.operation.clone(),
            input: request.payload.clone(),
            last_failure,
        });
        Outcome::Failure(failure)
    }
}

#[async_trait]
impl ResilienceOrchestrator for DefaultResilienceOrchestrator {
    async fn invoke_with(&self, request: &InvocationRequest, options: InvokeOptions) -> Outcome<Value> {
        self.invoke_decoded(request, options, Ok).await
    }
}

/// Builder for configuring resilience orchestrator
pub struct ResilienceOrchestratorBuilder {
    service_id: String,
    service: Arc<dyn RemoteService>,
    config: ResilienceConfig,
    classifier: Arc<dyn FailureClassifier>,
    registry: Option<Arc<CircuitBreakerRegistry>>,
    health_ping: Option<Arc<dyn HealthPing>>,
    health_cache: Option<Arc<HealthProbeCache>>,
    reporter: ErrorReporter,
    metrics: Arc<dyn MetricsCollector>,
    retry_hook: Option<Arc<dyn RetryHook>>,
}

impl ResilienceOrchestratorBuilder {
    /// Create a new builder with default configuration
    pub fn new(service_id: impl Into<String>, service: Arc<dyn RemoteService>) -> Self {
        Self {
            service_id: service_id.into(),
            service,
            config: ResilienceConfig::default(),
            classifier: Arc::new(DefaultFailureClassifier::new()),
            registry: None,
            health_ping: None,
            health_cache: None,
            reporter: ErrorReporter::default(),
            metrics: Arc::new(NoopMetricsCollector),
            retry_hook: None,
        }
    }

    /// Set the full resilience configuration
    pub fn config(mut self, config: ResilienceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the retry configuration
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.config.retry = config;
        self
    }

    /// Set the circuit breaker configuration
    pub fn circuit_breaker_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.config.circuit_breaker = config;
        self
    }

    /// Set which failures count against the breaker
    pub fn breaker_policy(mut self, policy: BreakerPolicy) -> Self {
        self.config.breaker_policy = policy;
        self
    }

    /// Use a custom classifier
    pub fn classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Take breakers from `registry` instead of the process-wide one
    pub fn registry(mut self, registry: Arc<CircuitBreakerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Liveness check used by the health cache
    pub fn health_ping(mut self, ping: Arc<dyn HealthPing>) -> Self {
        self.health_ping = Some(ping);
        self
    }

    /// Share an existing health cache
    pub fn health_cache(mut self, cache: Arc<HealthProbeCache>) -> Self {
        self.health_cache = Some(cache);
        self
    }

    /// Set the error reporter
    pub fn reporter(mut self, reporter: ErrorReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set the metrics collector
    pub fn metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Observe and steer scheduled retries
    pub fn retry_hook(mut self, hook: Arc<dyn RetryHook>) -> Self {
        self.retry_hook = Some(hook);
        self
    }

    /// Build the resilience orchestrator
    pub fn build(self) -> DefaultResilienceOrchestrator {
        let registry = self.registry.unwrap_or_else(CircuitBreakerRegistry::global);
        let breaker = registry.breaker(&self.service_id, &self.config.circuit_breaker);
        let health = self.health_cache.unwrap_or_else(|| {
            let ping = self.health_ping.unwrap_or_else(|| Arc::new(AssumeHealthy));
            Arc::new(HealthProbeCache::new(self.config.health.clone(), ping))
        });

        DefaultResilienceOrchestrator {
            service_id: self.service_id,
            service: self.service,
            config: self.config,
            classifier: self.classifier,
            breaker,
            health,
            reporter: self.reporter,
            metrics: self.metrics,
            retry_hook: self.retry_hook,
        }
    }
}
