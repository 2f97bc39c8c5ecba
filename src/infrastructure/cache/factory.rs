//! Cache factory sharing one clock and metrics sink across instances

use std::sync::Arc;

use crate::domain::cache::CacheConfig;
use crate::domain::{Clock, CoreError, MetricsSink, NoopMetricsSink};
use crate::infrastructure::clock::SystemClock;

use super::in_memory::InMemoryCache;

/// Factory for creating named cache instances
#[derive(Debug, Clone)]
pub struct CacheFactory {
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsSink>,
}

impl Default for CacheFactory {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(NoopMetricsSink))
    }
}

impl CacheFactory {
    pub fn new(clock: Arc<dyn Clock>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { clock, metrics }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Creates a cache, rejecting invalid configuration
    pub fn create(
        &self,
        name: impl Into<String>,
        config: &CacheConfig,
    ) -> Result<Arc<InMemoryCache>, CoreError> {
        let cache = InMemoryCache::with_collaborators(
            name,
            config.clone(),
            self.clock.clone(),
            self.metrics.clone(),
        )?;

        Ok(Arc::new(cache))
    }
}
