use crate::errors::ErrorCategory;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maps a retry index to the wait before that retry.
///
/// `retry` is 1 for the wait before the second attempt, 2 before the third,
/// and so on.
pub trait BackoffPolicy: Send + Sync {
    /// Wait before retry number `retry`
    fn delay(&self, retry: u32) -> Duration;
}

/// The same wait before every retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBackoff(pub Duration);

impl Default for ConstantBackoff {
    fn default() -> Self {
        Self(Duration::from_millis(crate::DEFAULT_BACKOFF_MILLIS))
    }
}

impl BackoffPolicy for ConstantBackoff {
    fn delay(&self, _retry: u32) -> Duration {
        self.0
    }
}

/// Exponential backoff with upward-only jitter, capped at `max_backoff`.
///
/// With a multiplier of at least `1 + jitter` the sequence of waits never
/// decreases.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Wait before the first retry
    pub initial_backoff: Duration,
    /// Upper bound on any wait
    pub max_backoff: Duration,
    /// Growth factor per retry
    pub backoff_multiplier: f64,
    /// Fraction of the base wait added at random (0.0 disables jitter)
    pub jitter: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_delay =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);

        let jitter = if self.jitter > 0.0 {
            rand::random::<f64>() * self.jitter * base_delay
        } else {
            0.0
        };
        let delay_ms = (base_delay + jitter).min(self.max_backoff.as_millis() as f64);

        Duration::from_millis(delay_ms.max(0.0) as u64)
    }
}

/// Adapts any `Fn(u32) -> Duration` into a [`BackoffPolicy`]
pub struct FnBackoff<F>(F);

impl<F> BackoffPolicy for FnBackoff<F>
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn delay(&self, retry: u32) -> Duration {
        (self.0)(retry)
    }
}

/// Build a backoff policy from a closure
pub fn backoff_fn<F>(f: F) -> FnBackoff<F>
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    FnBackoff(f)
}

/// Configuration for retry behavior
#[derive(Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (total attempts = `max_retries + 1`)
    pub max_retries: u32,
    /// Wait schedule between attempts
    pub backoff: Arc<dyn BackoffPolicy>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::DEFAULT_MAX_RETRIES,
            backoff: Arc::new(ConstantBackoff::default()),
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set the retry limit
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff policy
    pub fn with_backoff(mut self, backoff: impl BackoffPolicy + 'static) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("first_delay", &self.backoff.delay(1))
            .finish()
    }
}

/// Hook for custom retry behavior
#[async_trait]
pub trait RetryHook: Send + Sync {
    /// Called after a transient failure, before waiting for the next attempt
    async fn on_retry(&self, context: RetryContext) -> RetryDecision;
}

/// Context information for a retry attempt
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// The attempt that just failed (1-based)
    pub attempt: u32,
    /// Category of that failure
    pub category: ErrorCategory,
    /// Wait the backoff policy scheduled
    pub delay: Duration,
    /// Operation being invoked
    pub operation: String,
    /// Dependency being invoked
    pub service_id: String,
}

/// Decision on how to proceed with a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Use the default retry behavior
    Default,
    /// Retry with a custom delay
    Retry(Duration),
    /// Abort the retry and return the failure
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.backoff.delay(1), Duration::from_secs(1));
        assert_eq!(config.backoff.delay(2), Duration::from_secs(1));
    }

    #[test]
    fn test_constant_backoff() {
        let backoff = ConstantBackoff(Duration::from_millis(250));
        assert_eq!(backoff.delay(1), Duration::from_millis(250));
        assert_eq!(backoff.delay(10), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_backoff_without_jitter() {
        let backoff = ExponentialBackoff {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: 0.0,
        };

        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(400));
    }

    #[test]
    fn test_exponential_backoff_respects_max() {
        let backoff = ExponentialBackoff {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: 0.0,
        };

        assert_eq!(backoff.delay(10), Duration::from_secs(5));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_exponential_backoff_with_jitter_never_decreases() {
        let backoff = ExponentialBackoff {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: 0.5,
        };

        for _ in 0..50 {
            let delays: Vec<Duration> = (1..=8).map(|retry| backoff.delay(retry)).collect();
            assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]), "{:?}", delays);
            assert!(delays[0] >= Duration::from_millis(100));
            assert!(delays[0] <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_fn_backoff() {
        let config = RetryConfig::default().with_backoff(backoff_fn(|retry| Duration::from_millis(10 * retry as u64)));
        assert_eq!(config.backoff.delay(1), Duration::from_millis(10));
        assert_eq!(config.backoff.delay(3), Duration::from_millis(30));
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
    }
}
