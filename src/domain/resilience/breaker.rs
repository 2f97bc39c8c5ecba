use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::CoreError;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed,
    /// Failing fast, calls are rejected without running
    Open,
    /// Probing recovery
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Thresholds governing breaker transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive Closed-state failures that open the circuit
    pub failure_threshold: u32,
    /// Consecutive HalfOpen successes that close the circuit
    pub success_threshold: u32,
    /// Time an open circuit waits after its last failure before probing
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            recovery_timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            ..Default::default()
        }
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.failure_threshold == 0 {
            return Err(CoreError::configuration(
                "circuit breaker failure_threshold must be greater than zero",
            ));
        }

        if self.success_threshold == 0 {
            return Err(CoreError::configuration(
                "circuit breaker success_threshold must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Point-in-time view of one named breaker
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerState {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failure_count: u32,
    pub consecutive_success_count: u32,
    pub last_failure_at: Option<Instant>,
}
