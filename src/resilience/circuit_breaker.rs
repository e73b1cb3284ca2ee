use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive counted failures that open the circuit
    pub failure_threshold: u32,
    /// Time the circuit stays open before a trial call is allowed
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: crate::DEFAULT_CIRCUIT_THRESHOLD,
            cooldown: Duration::from_secs(crate::DEFAULT_CIRCUIT_COOLDOWN_SECS),
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the failure threshold
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set the cooldown
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// Circuit breaker state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are blocked
    Open,
    /// Circuit is half-open, one trial request tests recovery
    HalfOpen,
}

impl CircuitState {
    /// Numeric encoding used for gauges (0=closed, 1=open, 2=half-open)
    pub fn as_gauge(&self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::Open => 1.0,
            CircuitState::HalfOpen => 2.0,
        }
    }
}

/// Point-in-time copy of a breaker's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitSnapshot {
    /// Current state
    pub state: CircuitState,
    /// Consecutive counted failures since the last success
    pub consecutive_failures: u32,
    /// When the circuit last opened
    pub opened_at: Option<Instant>,
    /// Configured cooldown
    pub cooldown: Duration,
}

/// Admission was refused because the circuit is open or its trial slot is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitOpen {
    /// Time until a trial call may be admitted, when known
    pub retry_after: Option<Duration>,
}

struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Circuit breaker for one remote dependency.
///
/// All transitions happen under a single mutex, so concurrent callers observe
/// one linear sequence of states and exactly one caller can claim the
/// half-open trial.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    hook: Option<Arc<dyn CircuitBreakerHook>>,
    rejections: AtomicU64,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
            hook: None,
            rejections: AtomicU64::new(0),
        }
    }

    /// Add a hook for circuit breaker state changes
    pub fn with_hook(mut self, hook: Arc<dyn CircuitBreakerHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Name of the dependency this breaker guards
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Breaker configuration
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Ask for admission of one attempt.
    ///
    /// An open circuit whose cooldown has elapsed moves to half-open here, and
    /// the caller that performs that move owns the trial.
    pub fn try_acquire(&self) -> Result<CircuitPermit<'_>, CircuitOpen> {
        let mut transition = None;
        let admission = {
            let mut inner = self.inner.lock();
            match inner.state {
                CircuitState::Closed => Ok(false),
                CircuitState::Open => {
                    let elapsed = inner
                        .opened_at
                        .map_or(self.config.cooldown, |at| at.elapsed());
                    if elapsed >= self.config.cooldown {
                        inner.state = CircuitState::HalfOpen;
                        inner.trial_in_flight = true;
                        transition = Some((CircuitState::Open, CircuitState::HalfOpen));
                        Ok(true)
                    } else {
                        Err(CircuitOpen {
                            retry_after: Some(self.config.cooldown - elapsed),
                        })
                    }
                }
                CircuitState::HalfOpen => {
                    if inner.trial_in_flight {
                        Err(CircuitOpen { retry_after: None })
                    } else {
                        inner.trial_in_flight = true;
                        Ok(true)
                    }
                }
            }
        };

        if let Some((old, new)) = transition {
            self.notify_state_change(old, new);
        }

        match admission {
            Ok(trial) => Ok(CircuitPermit {
                breaker: self,
                trial,
                resolved: false,
            }),
            Err(rejection) => {
                self.rejections.fetch_add(1, Ordering::Relaxed);
                if let Some(hook) = &self.hook {
                    hook.on_rejected(&self.name);
                }
                Err(rejection)
            }
        }
    }

    /// Returns true if an admission right now would be rejected.
    ///
    /// Unlike [`try_acquire`](Self::try_acquire) this never changes state.
    pub fn is_open(&self) -> bool {
        let inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => inner
                .opened_at
                .map_or(false, |at| at.elapsed() < self.config.cooldown),
            CircuitState::HalfOpen => inner.trial_in_flight,
        }
    }

    /// Get the time until the circuit transitions to half-open
    pub fn time_until_half_open(&self) -> Option<Duration> {
        let inner = self.inner.lock();
        if inner.state != CircuitState::Open {
            return None;
        }

        let elapsed = inner.opened_at.map_or(self.config.cooldown, |at| at.elapsed());
        Some(self.config.cooldown.saturating_sub(elapsed))
    }

    /// Get the current state of the circuit breaker
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Get a consistent copy of the full breaker state
    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.inner.lock();
        CircuitSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            opened_at: inner.opened_at,
            cooldown: self.config.cooldown,
        }
    }

    /// Total admissions rejected since creation
    pub fn rejection_count(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }

    /// Record a successful request
    pub fn record_success(&self) {
        self.settle(true, true);
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        self.settle(false, true);
    }

    fn settle(&self, success: bool, from_trial: bool) {
        let transition = {
            let mut inner = self.inner.lock();
            match (inner.state, success) {
                (CircuitState::Closed, true) => {
                    inner.consecutive_failures = 0;
                    None
                }
                (CircuitState::Closed, false) => {
                    inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                    if inner.consecutive_failures >= self.config.failure_threshold {
                        inner.state = CircuitState::Open;
                        inner.opened_at = Some(Instant::now());
                        Some((CircuitState::Closed, CircuitState::Open))
                    } else {
                        None
                    }
                }
                // Late results from calls admitted before the trial do not decide it
                (CircuitState::HalfOpen, _) if !from_trial => None,
                (CircuitState::HalfOpen, true) => {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    inner.trial_in_flight = false;
                    Some((CircuitState::HalfOpen, CircuitState::Closed))
                }
                (CircuitState::HalfOpen, false) => {
                    inner.state = CircuitState::Open;
                    inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                    inner.opened_at = Some(Instant::now());
                    inner.trial_in_flight = false;
                    Some((CircuitState::HalfOpen, CircuitState::Open))
                }
                (CircuitState::Open, _) => None,
            }
        };

        if let Some((old, new)) = transition {
            self.notify_state_change(old, new);
        }
    }

    fn release_trial(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.trial_in_flight = false;
        }
    }

    fn notify_state_change(&self, old: CircuitState, new: CircuitState) {
        match new {
            CircuitState::Open => tracing::warn!(
                dependency = %self.name,
                from = ?old,
                cooldown_ms = self.config.cooldown.as_millis() as u64,
                "Circuit opened"
            ),
            _ => tracing::info!(dependency = %self.name, from = ?old, to = ?new, "Circuit state changed"),
        }

        if let Some(hook) = &self.hook {
            hook.on_state_change(&self.name, old, new);
        }
    }
}

/// Admission granted by [`CircuitBreaker::try_acquire`].
///
/// Resolve it with [`success`](Self::success), [`failure`](Self::failure) or
/// [`ignore`](Self::ignore). Dropping it unresolved frees the half-open trial
/// slot without deciding the trial.
#[must_use = "an unresolved permit does not report the attempt's outcome"]
pub struct CircuitPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    resolved: bool,
}

impl CircuitPermit<'_> {
    /// Returns true if this permit is the half-open trial
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// The attempt succeeded
    pub fn success(mut self) {
        self.resolved = true;
        self.breaker.settle(true, self.trial);
    }

    /// The attempt failed in a way that counts against the dependency
    pub fn failure(mut self) {
        self.resolved = true;
        self.breaker.settle(false, self.trial);
    }

    /// The attempt's outcome says nothing about the dependency's health
    pub fn ignore(mut self) {
        self.resolved = true;
        if self.trial {
            self.breaker.release_trial();
        }
    }
}

impl Drop for CircuitPermit<'_> {
    fn drop(&mut self) {
        if !self.resolved && self.trial {
            self.breaker.release_trial();
        }
    }
}

/// Hook for circuit breaker state changes
pub trait CircuitBreakerHook: Send + Sync {
    /// Called after every state transition
    fn on_state_change(&self, dependency: &str, old_state: CircuitState, new_state: CircuitState);

    /// Called when an admission is rejected
    fn on_rejected(&self, _dependency: &str) {}
}
