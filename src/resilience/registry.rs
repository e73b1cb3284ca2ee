use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerHook};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

static GLOBAL_REGISTRY: Lazy<Arc<CircuitBreakerRegistry>> =
    Lazy::new(|| Arc::new(CircuitBreakerRegistry::new()));

/// Owns one [`CircuitBreaker`] per remote dependency.
///
/// Breakers are created on first use and live as long as the registry. The
/// first configuration supplied for a dependency wins.
#[derive(Default)]
pub struct CircuitBreakerRegistry {
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
    hook: Option<Arc<dyn CircuitBreakerHook>>,
}

impl CircuitBreakerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by every orchestrator that does not bring its own
    pub fn global() -> Arc<CircuitBreakerRegistry> {
        GLOBAL_REGISTRY.clone()
    }

    /// Attach a hook to every breaker this registry creates from now on
    pub fn with_hook(mut self, hook: Arc<dyn CircuitBreakerHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Get the breaker for `dependency`, creating it with `config` if needed
    pub fn breaker(&self, dependency: &str, config: &CircuitBreakerConfig) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.read().get(dependency) {
            return existing.clone();
        }

        let mut breakers = self.breakers.write();
        breakers
            .entry(dependency.to_string())
            .or_insert_with(|| {
                let mut breaker = CircuitBreaker::new(dependency, config.clone());
                if let Some(hook) = &self.hook {
                    breaker = breaker.with_hook(hook.clone());
                }
                Arc::new(breaker)
            })
            .clone()
    }

    /// Look up an existing breaker without creating one
    pub fn get(&self, dependency: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.read().get(dependency).cloned()
    }

    /// Dependencies with a breaker
    pub fn dependencies(&self) -> Vec<String> {
        self.breakers.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitState;
    use std::time::Duration;

    #[test]
    fn test_same_dependency_shares_breaker() {
        let registry = CircuitBreakerRegistry::new();
        let config = CircuitBreakerConfig::default();

        let a = registry.breaker("calculator", &config);
        let b = registry.breaker("calculator", &config);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_dependencies_are_isolated() {
        let registry = CircuitBreakerRegistry::new();
        let config = CircuitBreakerConfig::default().with_failure_threshold(1);

        registry.breaker("calculator", &config).record_failure();

        assert_eq!(registry.breaker("calculator", &config).state(), CircuitState::Open);
        assert_eq!(registry.breaker("outlets", &config).state(), CircuitState::Closed);

        let mut names = registry.dependencies();
        names.sort();
        assert_eq!(names, vec!["calculator".to_string(), "outlets".to_string()]);
    }

    #[test]
    fn test_first_config_wins() {
        let registry = CircuitBreakerRegistry::new();
        registry.breaker("calculator", &CircuitBreakerConfig::default().with_cooldown(Duration::from_secs(5)));
        let again = registry.breaker("calculator", &CircuitBreakerConfig::default());
        assert_eq!(again.config().cooldown, Duration::from_secs(5));
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = CircuitBreakerRegistry::new();
        assert!(registry.get("calculator").is_none());
        assert!(registry.dependencies().is_empty());
    }

    #[test]
    fn test_global_is_shared() {
        let a = CircuitBreakerRegistry::global();
        let b = CircuitBreakerRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
