use crate::transport::HealthPing;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for health probing
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// How long a probe result stays valid
    pub ttl: Duration,
    /// Upper bound on a single liveness check
    pub probe_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(crate::DEFAULT_HEALTH_TTL_SECS),
            probe_timeout: Duration::from_secs(crate::DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

/// Last known availability of a dependency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthProbeResult {
    /// Whether the dependency answered its liveness check
    pub healthy: bool,
    /// When the result was obtained
    pub checked_at: Instant,
    /// How long the result stays valid
    pub ttl: Duration,
    /// Wall-clock time of the check, for logs
    pub observed_at: DateTime<Utc>,
}

impl HealthProbeResult {
    fn new(healthy: bool, ttl: Duration) -> Self {
        Self {
            healthy,
            checked_at: Instant::now(),
            ttl,
            observed_at: Utc::now(),
        }
    }

    /// Returns true while the result is within its TTL
    pub fn is_fresh(&self) -> bool {
        self.checked_at.elapsed() < self.ttl
    }

    /// Health as seen now; expired results are `Unknown`
    pub fn status(&self) -> HealthStatus {
        match (self.is_fresh(), self.healthy) {
            (false, _) => HealthStatus::Unknown,
            (true, true) => HealthStatus::Healthy,
            (true, false) => HealthStatus::Unhealthy,
        }
    }
}

/// Health of a dependency without probing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// A fresh result says the dependency is up
    Healthy,
    /// A fresh result says the dependency is down
    Unhealthy,
    /// No fresh result
    Unknown,
}

#[derive(Default)]
struct ProbeSlot {
    latest: Mutex<Option<HealthProbeResult>>,
    refresh: tokio::sync::Mutex<()>,
}

impl ProbeSlot {
    fn fresh(&self) -> Option<HealthProbeResult> {
        self.latest.lock().filter(|result| result.is_fresh())
    }
}

/// TTL cache of liveness checks, keyed by dependency id.
///
/// At most one refresh per dependency is in flight; callers arriving during a
/// refresh wait for it and reuse its result.
pub struct HealthProbeCache {
    config: HealthConfig,
    pinger: Arc<dyn HealthPing>,
    slots: RwLock<HashMap<String, Arc<ProbeSlot>>>,
    probes: AtomicU64,
}

impl HealthProbeCache {
    /// Create a cache that refreshes through `pinger`
    pub fn new(config: HealthConfig, pinger: Arc<dyn HealthPing>) -> Self {
        Self {
            config,
            pinger,
            slots: RwLock::new(HashMap::new()),
            probes: AtomicU64::new(0),
        }
    }

    /// Cache configuration
    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Return a fresh result for `service_id`, pinging the service if needed
    pub async fn probe(&self, service_id: &str) -> HealthProbeResult {
        let slot = self.slot(service_id);
        if let Some(result) = slot.fresh() {
            return result;
        }

        let _refreshing = slot.refresh.lock().await;
        if let Some(result) = slot.fresh() {
            return result;
        }

        self.probes.fetch_add(1, Ordering::Relaxed);
        let healthy =
            match tokio::time::timeout(self.config.probe_timeout, self.pinger.ping(service_id)).await {
                Ok(healthy) => healthy,
                Err(_) => {
                    tracing::debug!(
                        dependency = service_id,
                        timeout_ms = self.config.probe_timeout.as_millis() as u64,
                        "Health probe timed out"
                    );
                    false
                }
            };

        let result = HealthProbeResult::new(healthy, self.config.ttl);
        *slot.latest.lock() = Some(result);
        tracing::debug!(dependency = service_id, healthy, "Health probe refreshed");
        result
    }

    /// Current health without contacting the service
    pub fn peek(&self, service_id: &str) -> HealthStatus {
        self.slots
            .read()
            .get(service_id)
            .and_then(|slot| *slot.latest.lock())
            .map_or(HealthStatus::Unknown, |result| result.status())
    }

    /// Store an observation made by an invocation attempt
    pub fn record(&self, service_id: &str, healthy: bool) {
        let slot = self.slot(service_id);
        *slot.latest.lock() = Some(HealthProbeResult::new(healthy, self.config.ttl));
    }

    /// Forget the cached result for `service_id`
    pub fn invalidate(&self, service_id: &str) {
        if let Some(slot) = self.slots.read().get(service_id) {
            *slot.latest.lock() = None;
        }
    }

    /// Number of liveness checks actually sent
    pub fn probe_count(&self) -> u64 {
        self.probes.load(Ordering::Relaxed)
    }

    fn slot(&self, service_id: &str) -> Arc<ProbeSlot> {
        if let Some(slot) = self.slots.read().get(service_id) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(service_id.to_string())
            .or_default()
            .clone()
    }
}
