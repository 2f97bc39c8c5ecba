//! Named registry of caches, breakers and concurrency limiters
//!
//! Built once at startup and passed to call sites. Lookups are
//! get-or-create by name and instances live as long as the registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::cache::{Cache, CacheConfig, CacheStats};
use crate::domain::resilience::{CircuitBreakerConfig, CircuitBreakerState, ResilienceProfile};
use crate::domain::{Clock, CoreError, MetricsSink, NoopMetricsSink};
use crate::infrastructure::cache::{CacheFactory, InMemoryCache};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::resilience::{
    CircuitBreaker, ConcurrencyLimiter, ErrorClassifier, RetryExecutor,
};

#[derive(Debug)]
pub struct Registry {
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsSink>,
    cache_factory: CacheFactory,
    caches: RwLock<HashMap<String, Arc<InMemoryCache>>>,
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
    limiters: RwLock<HashMap<String, ConcurrencyLimiter>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(NoopMetricsSink))
    }
}

impl Registry {
    pub fn new(clock: Arc<dyn Clock>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            cache_factory: CacheFactory::new(clock.clone(), metrics.clone()),
            clock,
            metrics,
            caches: RwLock::new(HashMap::new()),
            breakers: RwLock::new(HashMap::new()),
            limiters: RwLock::new(HashMap::new()),
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn metrics(&self) -> Arc<dyn MetricsSink> {
        self.metrics.clone()
    }

    /// Returns the named cache, creating it with `config` on first lookup
    ///
    /// The configuration of an existing cache is left untouched.
    pub fn cache(&self, name: &str, config: &CacheConfig) -> Result<Arc<InMemoryCache>, CoreError> {
        if let Some(cache) = self.caches.read().get(name) {
            return Ok(cache.clone());
        }

        let mut caches = self.caches.write();

        if let Some(cache) = caches.get(name) {
            return Ok(cache.clone());
        }

        let cache = self.cache_factory.create(name, config)?;
        debug!(cache = %name, max_size = config.max_size, policy = %config.eviction_policy, "Registered cache");
        caches.insert(name.to_string(), cache.clone());

        Ok(cache)
    }

    pub fn get_cache(&self, name: &str) -> Option<Arc<InMemoryCache>> {
        self.caches.read().get(name).cloned()
    }

    /// Returns the named breaker, creating it with `config` on first lookup
    pub fn breaker(
        &self,
        name: &str,
        config: &CircuitBreakerConfig,
    ) -> Result<Arc<CircuitBreaker>, CoreError> {
        if let Some(breaker) = self.breakers.read().get(name) {
            return Ok(breaker.clone());
        }

        config.validate()?;

        let mut breakers = self.breakers.write();

        let breaker = breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::with_collaborators(
                    name,
                    config.clone(),
                    self.clock.clone(),
                    self.metrics.clone(),
                ))
            })
            .clone();

        Ok(breaker)
    }

    pub fn get_breaker(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.read().get(name).cloned()
    }

    /// Returns the limiter shared by all callers of an operation class
    pub fn limiter(&self, class: &str, limit: usize) -> Result<ConcurrencyLimiter, CoreError> {
        if let Some(limiter) = self.limiters.read().get(class) {
            return Ok(limiter.clone());
        }

        let mut limiters = self.limiters.write();

        if let Some(limiter) = limiters.get(class) {
            return Ok(limiter.clone());
        }

        let limiter = ConcurrencyLimiter::new(class, limit)?;
        limiters.insert(class.to_string(), limiter.clone());

        Ok(limiter)
    }

    /// Builds an executor for one operation class
    ///
    /// The breaker and the limiter are both keyed by the class, so classes
    /// built from one profile never take each other's permits.
    pub fn executor(&self, class: &str, profile: &ResilienceProfile) -> Result<RetryExecutor, CoreError> {
        profile.validate()?;

        let breaker = self.breaker(class, &profile.breaker)?;

        let mut builder = RetryExecutor::builder(class)
            .config(profile.retry.clone())
            .breaker(breaker)
            .classifier(ErrorClassifier::default())
            .clock(self.clock.clone())
            .metrics(self.metrics.clone());

        if let Some(limit) = profile.concurrency_limit {
            builder = builder.limiter(self.limiter(class, limit)?);
        }

        builder.build()
    }

    /// Stats of every registered cache, sorted by name
    pub fn cache_stats(&self) -> Vec<CacheStats> {
        let mut stats: Vec<CacheStats> = self.caches.read().values().map(|cache| cache.stats()).collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    /// Snapshots of every registered breaker, sorted by name
    pub fn breaker_states(&self) -> Vec<CircuitBreakerState> {
        let mut states: Vec<CircuitBreakerState> =
            self.breakers.read().values().map(|breaker| breaker.snapshot()).collect();
        states.sort_by(|a, b| a.name.cmp(&b.name));
        states
    }
}
