use std::fmt::Debug;
use std::time::Duration;

use crate::domain::resilience::CircuitState;
use crate::domain::storage::OverallStatus;

/// Write-only sink for operational metrics
///
/// Every method defaults to a no-op; implementations override what they record.
/// Recording must never influence control flow.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsSink: Send + Sync + Debug {
    fn cache_hit(&self, _cache: &str) {}

    fn cache_miss(&self, _cache: &str) {}

    fn cache_eviction(&self, _cache: &str) {}

    fn cache_expiration(&self, _cache: &str) {}

    fn breaker_transition(&self, _breaker: &str, _from: CircuitState, _to: CircuitState) {}

    fn retry_attempt(&self, _operation: &str, _attempt: u32, _success: bool) {}

    fn backend_latency(&self, _backend: &str, _latency: Duration, _success: bool) {}

    fn storage_outcome(&self, _status: OverallStatus) {}
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {}
