//! Circuit breaker - Per-name failure gating state machine

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::resilience::{CircuitBreakerConfig, CircuitBreakerState, CircuitState};
use crate::domain::{Clock, MetricsSink, NoopMetricsSink};
use crate::infrastructure::clock::SystemClock;

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failures: u32,
    successes: u32,
    last_failure_at: Option<Instant>,
}

/// Circuit breaker for a single named dependency
///
/// `can_execute` is the only gate and is consulted once per attempt.
/// `record_success` and `record_failure` are called once per settled attempt.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsSink>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self::with_collaborators(name, config, Arc::new(SystemClock), Arc::new(NoopMetricsSink))
    }

    pub fn with_collaborators(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let name = name.into();

        debug!(
            breaker = %name,
            failure_threshold = config.failure_threshold,
            success_threshold = config.success_threshold,
            recovery_timeout_secs = config.recovery_timeout.as_secs(),
            "Circuit breaker created"
        );

        Self {
            name,
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                last_failure_at: None,
            }),
            clock,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Decides whether an attempt may run
    ///
    /// An open breaker whose recovery timeout has passed moves to half-open
    /// and admits the calling attempt as a probe.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure_at
                    .map(|at| self.clock.elapsed_since(at))
                    .unwrap_or(Duration::MAX);

                if elapsed > self.config.recovery_timeout {
                    inner.successes = 0;
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => {
                inner.failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.successes += 1;

                if inner.successes >= self.config.success_threshold {
                    inner.failures = 0;
                    inner.successes = 0;
                    self.transition(&mut inner, CircuitState::Closed);
                }
            }
            CircuitState::Open => {
                debug!(breaker = %self.name, "Success recorded while open, ignoring");
            }
        }
    }

    pub fn record_failure(&self) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => {
                inner.failures += 1;

                if inner.failures >= self.config.failure_threshold {
                    inner.last_failure_at = Some(now);
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {
                inner.failures += 1;
                inner.successes = 0;
                inner.last_failure_at = Some(now);
                self.transition(&mut inner, CircuitState::Open);
            }
            CircuitState::Open => {
                debug!(breaker = %self.name, "Failure recorded while open, ignoring");
            }
        }
    }

    /// Remaining cooldown before an open breaker admits a probe
    pub fn retry_after(&self) -> Duration {
        let inner = self.inner.lock();

        match (inner.state, inner.last_failure_at) {
            (CircuitState::Open, Some(at)) => self
                .config
                .recovery_timeout
                .saturating_sub(self.clock.elapsed_since(at)),
            _ => Duration::ZERO,
        }
    }

    pub fn snapshot(&self) -> CircuitBreakerState {
        let inner = self.inner.lock();

        CircuitBreakerState {
            name: self.name.clone(),
            state: inner.state,
            consecutive_failure_count: inner.failures,
            consecutive_success_count: inner.successes,
            last_failure_at: inner.last_failure_at,
        }
    }

    /// Forces the breaker back to closed with cleared counters
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.failures = 0;
        inner.successes = 0;
        inner.last_failure_at = None;

        if inner.state != CircuitState::Closed {
            self.transition(&mut inner, CircuitState::Closed);
        }
    }

    fn transition(&self, inner: &mut BreakerInner, to: CircuitState) {
        let from = inner.state;
        inner.state = to;

        match to {
            CircuitState::Open => warn!(
                breaker = %self.name,
                from = %from,
                failures = inner.failures,
                recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
                "Circuit breaker opened"
            ),
            CircuitState::HalfOpen => info!(
                breaker = %self.name,
                from = %from,
                "Circuit breaker half-open, probing recovery"
            ),
            CircuitState::Closed => info!(
                breaker = %self.name,
                from = %from,
                "Circuit breaker closed"
            ),
        }

        self.metrics.breaker_transition(&self.name, from, to);
    }
}
