//! Resilient Store
//!
//! An in-process resilience and caching substrate with support for:
//! - Bounded caches with LRU, TTL+LRU and smart eviction
//! - Circuit-breaker gated retries with exponential backoff and jitter
//! - Dual writes to a primary and a secondary backend with partial-failure
//!   tolerance, idempotent short-circuiting and version history

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;
pub use domain::{CoreError, ErrorKind};

use std::sync::Arc;

use domain::storage::{PrimaryBackend, SecondaryBackend};
use domain::{MetricsSink, NoopMetricsSink};
use infrastructure::{
    clock::SystemClock,
    logging::init_logging,
    observability::{init_metrics, PrometheusMetrics, RecorderMetricsSink},
    registry::Registry,
    services::{DualWriteConfig, DualWriteCoordinator, DualWriteDeps},
};

/// Registry name of the store-outcome cache
pub const OUTCOME_CACHE: &str = "outcomes";

/// Registry name of the read-through item cache
pub const READ_CACHE: &str = "reads";

/// Installs logging and, when enabled, the Prometheus recorder
pub fn init_observability(config: &AppConfig) -> Result<Option<PrometheusMetrics>, CoreError> {
    init_logging(&config.logging)?;
    Ok(init_metrics(&config.metrics))
}

/// Sink matching the metrics configuration
pub fn metrics_sink(config: &AppConfig) -> Arc<dyn MetricsSink> {
    if config.metrics.enabled {
        Arc::new(RecorderMetricsSink)
    } else {
        Arc::new(NoopMetricsSink)
    }
}

/// Builds the process-wide registry of caches, breakers and limiters
pub fn build_registry(config: &AppConfig) -> Result<Registry, CoreError> {
    config.validate()?;
    Ok(Registry::new(Arc::new(SystemClock), metrics_sink(config)))
}

/// Wires a coordinator from configuration
///
/// Each backend gets its own breaker and concurrency limiter, both named
/// `<profile>:<backend>`.
pub fn build_coordinator(
    config: &AppConfig,
    registry: &Registry,
    primary: Arc<dyn PrimaryBackend>,
    secondary: Arc<dyn SecondaryBackend>,
) -> Result<DualWriteCoordinator, CoreError> {
    config.validate()?;

    let primary_profile = config.profile(&config.coordinator.primary_profile)?;
    let secondary_profile = config.profile(&config.coordinator.secondary_profile)?;

    let primary_executor = registry.executor(
        &format!("{}:{}", primary_profile.name, primary.name()),
        &primary_profile,
    )?;
    let secondary_executor = registry.executor(
        &format!("{}:{}", secondary_profile.name, secondary.name()),
        &secondary_profile,
    )?;

    let outcome_cache = registry.cache(OUTCOME_CACHE, &config.caches.outcome.to_cache_config())?;
    let read_cache = registry.cache(READ_CACHE, &config.caches.read.to_cache_config())?;

    let deps = DualWriteDeps {
        primary,
        secondary,
        primary_executor,
        secondary_executor,
        outcome_cache,
        read_cache,
    };

    let coordinator_config = DualWriteConfig::default()
        .with_version_history_limit(config.coordinator.version_history_limit)
        .with_discriminating_keys(config.coordinator.discriminating_keys.iter().cloned());

    tracing::info!(
        primary = %deps.primary.name(),
        secondary = %deps.secondary.name(),
        primary_profile = %primary_profile.name,
        secondary_profile = %secondary_profile.name,
        "Dual-write coordinator configured"
    );

    Ok(DualWriteCoordinator::new(deps, coordinator_config).with_metrics(registry.metrics()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::storage::{OverallStatus, StorableItem};
    use infrastructure::storage::{InMemoryPrimaryBackend, InMemorySecondaryBackend};

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.metrics.enabled = false;
        config
    }

    #[tokio::test]
    async fn test_build_coordinator_from_defaults() {
        let config = quiet_config();
        let registry = build_registry(&config).unwrap();
        let primary = Arc::new(InMemoryPrimaryBackend::default());
        let secondary = Arc::new(InMemorySecondaryBackend::default());

        let coordinator =
            build_coordinator(&config, &registry, primary.clone(), secondary.clone()).unwrap();

        let outcome = coordinator
            .store(StorableItem::new("buenos dias").with_metadata("source", "manual"))
            .await
            .unwrap();

        assert_eq!(outcome.status, OverallStatus::FullSuccess);
        assert_eq!(primary.len(), 1);
        assert_eq!(secondary.len(), 1);

        let names: Vec<String> = registry.breaker_states().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["storage:primary".to_string(), "storage:secondary".to_string()]);

        let caches: Vec<String> = registry.cache_stats().into_iter().map(|s| s.name).collect();
        assert_eq!(caches, vec![OUTCOME_CACHE.to_string(), READ_CACHE.to_string()]);
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let mut config = quiet_config();
        config.caches.outcome.max_size = 0;

        assert!(matches!(
            build_registry(&config),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_unknown_profile_fails_construction() {
        let mut config = quiet_config();
        let registry = build_registry(&config).unwrap();
        config.coordinator.secondary_profile = "archive".to_string();

        let result = build_coordinator(
            &config,
            &registry,
            Arc::new(InMemoryPrimaryBackend::default()),
            Arc::new(InMemorySecondaryBackend::default()),
        );

        assert!(matches!(result, Err(CoreError::Configuration { .. })));
    }
}
