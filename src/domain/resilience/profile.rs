use std::time::Duration;

use super::{CircuitBreakerConfig, RetryConfig};
use crate::domain::CoreError;

/// Retry + breaker + concurrency settings shared by one class of operations
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceProfile {
    pub name: String,
    pub retry: RetryConfig,
    pub breaker: CircuitBreakerConfig,
    /// Maximum in-flight calls for the class, `None` for unbounded
    pub concurrency_limit: Option<usize>,
}

impl ResilienceProfile {
    pub fn new(name: impl Into<String>, retry: RetryConfig, breaker: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            retry,
            breaker,
            concurrency_limit: None,
        }
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }

    /// Writes and reads against the persistent backends
    pub fn storage() -> Self {
        Self::new(
            "storage",
            RetryConfig::new(3)
                .with_base_delay(Duration::from_secs(2))
                .with_max_delay(Duration::from_secs(30))
                .with_attempt_timeout(Duration::from_secs(30)),
            CircuitBreakerConfig::new(5, Duration::from_secs(60)),
        )
        .with_concurrency_limit(32)
    }

    /// Slow third-party calls such as embedding providers
    pub fn external_api() -> Self {
        Self::new(
            "external-api",
            RetryConfig::new(5)
                .with_base_delay(Duration::from_secs(1))
                .with_max_delay(Duration::from_secs(60))
                .with_attempt_timeout(Duration::from_secs(60)),
            CircuitBreakerConfig::new(3, Duration::from_secs(30)),
        )
        .with_concurrency_limit(8)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.retry.validate()?;
        self.breaker.validate()?;

        if self.concurrency_limit == Some(0) {
            return Err(CoreError::configuration(format!(
                "profile '{}' concurrency_limit must be greater than zero",
                self.name
            )));
        }

        Ok(())
    }
}
