//! Metrics collection for invocation tracking.
//!
//! Counters, histograms and gauges with label support. Collectors are
//! pluggable so the orchestrator can report into whatever backend the host
//! application uses.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for invocation activity.
pub trait MetricsCollector: Send + Sync {
    /// Increments a counter by the given value.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the counter
    /// * `value` - The value to add to the counter
    /// * `labels` - Optional key-value labels for the metric
    fn increment_counter(&self, name: &str, value: u64, labels: &[(&str, &str)]);

    /// Records a value in a histogram.
    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]);

    /// Sets a gauge to the given value.
    fn set_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]);
}

/// In-memory metrics collector for testing and simple use cases.
#[derive(Default)]
pub struct InMemoryMetricsCollector {
    counters: RwLock<HashMap<String, AtomicU64>>,
    histograms: RwLock<HashMap<String, Vec<f64>>>,
    gauges: RwLock<HashMap<String, f64>>,
}

impl InMemoryMetricsCollector {
    /// Creates a new in-memory metrics collector.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_remote_tool::observability::{InMemoryMetricsCollector, MetricsCollector};
    ///
    /// let collector = InMemoryMetricsCollector::new();
    /// collector.increment_counter("attempts", 1, &[("dependency", "calculator")]);
    /// assert_eq!(collector.get_counter("attempts:dependency=calculator"), 1);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current value of a counter, 0 if it was never incremented.
    ///
    /// Labelled counters are addressed as `name:key=value,key=value`.
    pub fn get_counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Gets all recorded values for a histogram.
    pub fn get_histogram(&self, name: &str) -> Vec<f64> {
        self.histograms.read().get(name).cloned().unwrap_or_default()
    }

    /// Gets the current value of a gauge.
    pub fn get_gauge(&self, name: &str) -> Option<f64> {
        self.gauges.read().get(name).copied()
    }

    /// Resets all metrics.
    pub fn reset(&self) {
        self.counters.write().clear();
        self.histograms.write().clear();
        self.gauges.write().clear();
    }

    fn make_key(name: &str, labels: &[(&str, &str)]) -> String {
        if labels.is_empty() {
            name.to_string()
        } else {
            let label_str: Vec<String> = labels.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}:{}", name, label_str.join(","))
        }
    }
}

impl MetricsCollector for InMemoryMetricsCollector {
    fn increment_counter(&self, name: &str, value: u64, labels: &[(&str, &str)]) {
        let key = Self::make_key(name, labels);
        if let Some(counter) = self.counters.read().get(&key) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }
        self.counters
            .write()
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let key = Self::make_key(name, labels);
        self.histograms.write().entry(key).or_default().push(value);
    }

    fn set_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let key = Self::make_key(name, labels);
        self.gauges.write().insert(key, value);
    }
}

/// No-op metrics collector.
pub struct NoopMetricsCollector;

impl MetricsCollector for NoopMetricsCollector {
    fn increment_counter(&self, _name: &str, _value: u64, _labels: &[(&str, &str)]) {}
    fn record_histogram(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
    fn set_gauge(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
}

/// Metric names emitted by the orchestrator.
///
/// Every metric carries a `dependency` label; outcome metrics also carry
/// `category` and `resolution`.
pub mod metric_names {
    /// Invocation sequences started
    pub const INVOCATIONS: &str = "remote_tool.invocations.total";

    /// Remote attempts actually sent
    pub const ATTEMPTS: &str = "remote_tool.attempts.total";

    /// Duration of a single remote attempt in milliseconds
    pub const ATTEMPT_DURATION_MS: &str = "remote_tool.attempts.duration_ms";

    /// Retries scheduled after a transient failure
    pub const RETRIES: &str = "remote_tool.retries.total";

    /// Sequences that ended in success
    pub const SUCCESSES: &str = "remote_tool.outcomes.success";

    /// Sequences that ended in failure
    pub const FAILURES: &str = "remote_tool.outcomes.failure";

    /// Admissions rejected by an open circuit
    pub const CIRCUIT_REJECTIONS: &str = "remote_tool.circuit_breaker.rejections";

    /// Current state of the circuit breaker (0=closed, 1=open, 2=half-open)
    pub const CIRCUIT_BREAKER_STATE: &str = "remote_tool.circuit_breaker.state";

    /// Pre-flight health probes that found the dependency down
    pub const HEALTH_PROBE_FAILURES: &str = "remote_tool.health.probe_failures";
}
