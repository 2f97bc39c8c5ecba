use std::time::Duration;

use crate::domain::CoreError;

/// Retry configuration for a fallible operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap applied to computed backoff delays
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub exponential_base: f64,
    /// Scale each computed delay into `[0.5, 1.0] x delay`
    pub jitter_enabled: bool,
    /// Per-attempt deadline on `tokio::time`, `None` lets attempts run unbounded
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            exponential_base: 2.0,
            jitter_enabled: true,
            attempt_timeout: None,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_exponential_base(mut self, base: f64) -> Self {
        self.exponential_base = base;
        self
    }

    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.jitter_enabled = enabled;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Unjittered delay after the given failed attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_nanos = self.base_delay.as_nanos() as f64 * self.exponential_base.powi(exponent);
        let capped = delay_nanos.min(self.max_delay.as_nanos() as f64);

        if capped.is_finite() && capped >= 0.0 {
            Duration::from_nanos(capped.round() as u64)
        } else {
            self.max_delay
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_attempts == 0 {
            return Err(CoreError::configuration(
                "retry max_attempts must be at least 1",
            ));
        }

        if !self.exponential_base.is_finite() || self.exponential_base < 1.0 {
            return Err(CoreError::configuration(
                "retry exponential_base must be a finite number >= 1.0",
            ));
        }

        if self.base_delay > self.max_delay {
            return Err(CoreError::configuration(
                "retry base_delay must not exceed max_delay",
            ));
        }

        if self.attempt_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(CoreError::configuration(
                "retry attempt_timeout must be greater than zero",
            ));
        }

        Ok(())
    }
}
