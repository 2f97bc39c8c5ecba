//! Retry executor - Breaker-gated retries with exponential backoff

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::domain::resilience::RetryConfig;
use crate::domain::{Clock, CoreError, MetricsSink, NoopMetricsSink};
use crate::infrastructure::clock::SystemClock;

use super::circuit_breaker::CircuitBreaker;
use super::classifier::ErrorClassifier;
use super::limiter::ConcurrencyLimiter;

/// Runs fallible async operations with retries
///
/// Per attempt the breaker is consulted first; a rejection ends the call with
/// `CircuitOpen` and is not counted as an attempt. Each settled attempt is
/// reported to the breaker exactly once.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    operation: String,
    config: RetryConfig,
    breaker: Option<Arc<CircuitBreaker>>,
    limiter: Option<ConcurrencyLimiter>,
    classifier: ErrorClassifier,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsSink>,
}

impl RetryExecutor {
    pub fn builder(operation: impl Into<String>) -> RetryExecutorBuilder {
        RetryExecutorBuilder::new(operation)
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.breaker.as_ref()
    }

    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let _permit = match &self.limiter {
            Some(limiter) => Some(limiter.try_acquire()?),
            None => None,
        };

        let mut attempt: u32 = 0;

        loop {
            if let Some(breaker) = &self.breaker {
                if !breaker.can_execute() {
                    let retry_after = breaker.retry_after();
                    debug!(
                        operation = %self.operation,
                        breaker = %breaker.name(),
                        retry_after_ms = retry_after.as_millis() as u64,
                        "Call rejected by open circuit breaker"
                    );
                    return Err(CoreError::circuit_open(breaker.name(), retry_after));
                }
            }

            attempt += 1;

            let result = match self.config.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, operation()).await {
                    Ok(result) => result,
                    Err(elapsed) => Err(anyhow::Error::new(elapsed)),
                },
                None => operation().await,
            };

            match result {
                Ok(value) => {
                    if let Some(breaker) = &self.breaker {
                        breaker.record_success();
                    }
                    self.metrics.retry_attempt(&self.operation, attempt, true);

                    if attempt > 1 {
                        info!(operation = %self.operation, attempt, "Operation succeeded after retry");
                    }

                    return Ok(value);
                }
                Err(error) => {
                    let classification = self.classifier.classify(&error);

                    if let Some(breaker) = &self.breaker {
                        breaker.record_failure();
                    }
                    self.metrics.retry_attempt(&self.operation, attempt, false);

                    if !classification.retryable {
                        warn!(
                            operation = %self.operation,
                            attempt,
                            kind = %classification.kind,
                            error = %classification.message,
                            "Operation failed with terminal error"
                        );
                        return Err(classification.into_error());
                    }

                    if attempt >= self.config.max_attempts {
                        warn!(
                            operation = %self.operation,
                            attempts = attempt,
                            kind = %classification.kind,
                            error = %classification.message,
                            "Operation failed, retries exhausted"
                        );
                        return Err(classification.into_error());
                    }

                    let delay = self.backoff_delay(attempt - 1, classification.retry_after);

                    debug!(
                        operation = %self.operation,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        kind = %classification.kind,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying operation"
                    );

                    self.clock.sleep(delay).await;
                }
            }
        }
    }

    /// A provider-suggested delay is used as given; computed delays are capped then jittered
    fn backoff_delay(&self, retry_index: u32, provider_delay: Option<Duration>) -> Duration {
        if let Some(delay) = provider_delay {
            return delay;
        }

        let delay = self.config.delay_for_attempt(retry_index);

        if self.config.jitter_enabled {
            jitter(delay)
        } else {
            delay
        }
    }
}

fn jitter(delay: Duration) -> Duration {
    let factor: f64 = rand::thread_rng().gen_range(0.5..=1.0);
    delay.mul_f64(factor)
}

/// Builder for [`RetryExecutor`]
#[derive(Debug)]
pub struct RetryExecutorBuilder {
    operation: String,
    config: RetryConfig,
    breaker: Option<Arc<CircuitBreaker>>,
    limiter: Option<ConcurrencyLimiter>,
    classifier: ErrorClassifier,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsSink>,
}

impl RetryExecutorBuilder {
    fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            config: RetryConfig::default(),
            breaker: None,
            limiter: None,
            classifier: ErrorClassifier::default(),
            clock: Arc::new(SystemClock),
            metrics: Arc::new(NoopMetricsSink),
        }
    }

    pub fn config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    pub fn limiter(mut self, limiter: ConcurrencyLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> Result<RetryExecutor, CoreError> {
        self.config.validate()?;

        Ok(RetryExecutor {
            operation: self.operation,
            config: self.config,
            breaker: self.breaker,
            limiter: self.limiter,
            classifier: self.classifier,
            clock: self.clock,
            metrics: self.metrics,
        })
    }
}
