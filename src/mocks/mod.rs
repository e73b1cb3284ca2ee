//! Mock implementations for testing.
//!
//! Scripted fakes for the remote boundaries plus recording hooks, and
//! `mockall` mocks where call expectations read better.

use crate::errors::FailureSignal;
use crate::resilience::{CircuitBreakerHook, CircuitState, RetryContext, RetryDecision, RetryHook};
use crate::transport::{HealthPing, RemoteService};
use crate::types::InvocationRequest;
use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Remote service that replays a script of results.
///
/// Results are returned in order; once the script is exhausted the last
/// entry repeats.
pub struct ScriptedRemoteService {
    script: Mutex<Vec<Result<Value, FailureSignal>>>,
    last: Mutex<Option<Result<Value, FailureSignal>>>,
    requests: Mutex<Vec<InvocationRequest>>,
    calls: AtomicU32,
    delay: Option<Duration>,
}

impl ScriptedRemoteService {
    /// Replay `script` in order
    pub fn new(script: Vec<Result<Value, FailureSignal>>) -> Self {
        let mut script = script;
        script.reverse();
        Self {
            script: Mutex::new(script),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            delay: None,
        }
    }

    /// Succeed with `value` on every call
    pub fn always_ok(value: Value) -> Self {
        Self::new(vec![Ok(value)])
    }

    /// Fail with `signal` on every call
    pub fn always_err(signal: FailureSignal) -> Self {
        Self::new(vec![Err(signal)])
    }

    /// Wait before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls started so far
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<InvocationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_result(&self) -> Result<Value, FailureSignal> {
        let next = self.script.lock().unwrap().pop();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(result) => {
                *last = Some(result.clone());
                result
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(FailureSignal::other("empty script"))),
        }
    }
}

#[async_trait]
impl RemoteService for ScriptedRemoteService {
    async fn call(&self, request: &InvocationRequest) -> Result<Value, FailureSignal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_result()
    }
}

/// Liveness check with a switchable answer.
pub struct ScriptedHealthPing {
    healthy: AtomicBool,
    pings: AtomicU32,
    delay: Option<Duration>,
}

impl ScriptedHealthPing {
    /// Answer `healthy` until told otherwise
    pub fn new(healthy: bool) -> Self {
        Self {
            healthy: AtomicBool::new(healthy),
            pings: AtomicU32::new(0),
            delay: None,
        }
    }

    /// Wait before answering each ping
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change the answer
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Pings received so far
    pub fn ping_count(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthPing for ScriptedHealthPing {
    async fn ping(&self, _service_id: &str) -> bool {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Retry hook that records every context and answers with a fixed decision.
pub struct RecordingRetryHook {
    decision: RetryDecision,
    contexts: Mutex<Vec<RetryContext>>,
}

impl RecordingRetryHook {
    /// Record and keep the default behavior
    pub fn new() -> Self {
        Self::with_decision(RetryDecision::Default)
    }

    /// Record and answer with `decision`
    pub fn with_decision(decision: RetryDecision) -> Self {
        Self {
            decision,
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Contexts seen so far
    pub fn contexts(&self) -> Vec<RetryContext> {
        self.contexts.lock().unwrap().clone()
    }

    /// Scheduled delays seen so far
    pub fn delays(&self) -> Vec<Duration> {
        self.contexts().iter().map(|c| c.delay).collect()
    }
}

impl Default for RecordingRetryHook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RetryHook for RecordingRetryHook {
    async fn on_retry(&self, context: RetryContext) -> RetryDecision {
        self.contexts.lock().unwrap().push(context);
        self.decision
    }
}

/// Breaker hook that records transitions and rejections.
#[derive(Default)]
pub struct RecordingBreakerHook {
    transitions: Mutex<Vec<(String, CircuitState, CircuitState)>>,
    rejections: AtomicU32,
}

impl RecordingBreakerHook {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions seen so far as `(dependency, old, new)`
    pub fn transitions(&self) -> Vec<(String, CircuitState, CircuitState)> {
        self.transitions.lock().unwrap().clone()
    }

    /// Rejections seen so far
    pub fn rejections(&self) -> u32 {
        self.rejections.load(Ordering::SeqCst)
    }
}

impl CircuitBreakerHook for RecordingBreakerHook {
    fn on_state_change(&self, dependency: &str, old_state: CircuitState, new_state: CircuitState) {
        self.transitions
            .lock()
            .unwrap()
            .push((dependency.to_string(), old_state, new_state));
    }

    fn on_rejected(&self, _dependency: &str) {
        self.rejections.fetch_add(1, Ordering::SeqCst);
    }
}

// Mockall-based mocks for expectation-style tests
mock! {
    pub RemoteService {}

    #[async_trait]
    impl RemoteService for RemoteService {
        async fn call(&self, request: &InvocationRequest) -> Result<Value, FailureSignal>;
    }
}

mock! {
    pub Pinger {}

    #[async_trait]
    impl HealthPing for Pinger {
        async fn ping(&self, service_id: &str) -> bool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_service_replays_then_repeats_last() {
        let service = ScriptedRemoteService::new(vec![
            Err(FailureSignal::timeout()),
            Ok(json!({"result": 1.0})),
        ]);
        let request = InvocationRequest::new("calculate", json!({"expression": "1"}));

        assert!(service.call(&request).await.is_err());
        assert!(service.call(&request).await.is_ok());
        assert!(service.call(&request).await.is_ok());
        assert_eq!(service.call_count(), 3);
        assert_eq!(service.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_scripted_health_ping() {
        let ping = ScriptedHealthPing::new(true);
        assert!(ping.ping("calculator").await);
        ping.set_healthy(false);
        assert!(!ping.ping("calculator").await);
        assert_eq!(ping.ping_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_remote_service() {
        let mut service = MockRemoteService::new();
        service
            .expect_call()
            .times(1)
            .returning(|_| Err(FailureSignal::missing_credential()));

        let request = InvocationRequest::new("calculate", json!({}));
        let signal = service.call(&request).await.unwrap_err();
        assert_eq!(signal, FailureSignal::missing_credential());
    }
}
