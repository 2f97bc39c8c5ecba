//! Dual-write coordination across a primary and a secondary backend

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::cache::{Cache, CacheExt};
use crate::domain::storage::{
    BackendOutcome, Fingerprinter, ItemChanges, OverallStatus, PrimaryBackend, SecondaryBackend,
    StorableItem, StorageOutcome, DEFAULT_DISCRIMINATING_KEYS, DEFAULT_VERSION_HISTORY_LIMIT,
};
use crate::domain::{CoreError, MetricsSink, NoopMetricsSink};
use crate::infrastructure::resilience::RetryExecutor;

/// Configuration for the dual-write coordinator
#[derive(Debug, Clone)]
pub struct DualWriteConfig {
    /// Number of version history entries kept per item
    pub version_history_limit: usize,
    /// Metadata keys that take part in the fingerprint
    pub discriminating_keys: Vec<String>,
}

impl Default for DualWriteConfig {
    fn default() -> Self {
        Self {
            version_history_limit: DEFAULT_VERSION_HISTORY_LIMIT,
            discriminating_keys: DEFAULT_DISCRIMINATING_KEYS
                .iter()
                .map(|key| key.to_string())
                .collect(),
        }
    }
}

impl DualWriteConfig {
    pub fn with_version_history_limit(mut self, limit: usize) -> Self {
        self.version_history_limit = limit;
        self
    }

    pub fn with_discriminating_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.discriminating_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

/// Collaborators wired into the coordinator
#[derive(Debug, Clone)]
pub struct DualWriteDeps {
    pub primary: Arc<dyn PrimaryBackend>,
    pub secondary: Arc<dyn SecondaryBackend>,
    pub primary_executor: RetryExecutor,
    pub secondary_executor: RetryExecutor,
    /// Store outcomes keyed by fingerprint
    pub outcome_cache: Arc<dyn Cache>,
    /// Items read through from the primary backend, keyed by id
    pub read_cache: Arc<dyn Cache>,
}

fn outcome_key(fingerprint: &str) -> String {
    format!("outcome:{}", fingerprint)
}

fn read_key(id: &str) -> String {
    format!("item:{}", id)
}

/// Persists items to two independent backends
///
/// Each backend is written through its own retry executor and breaker, so a
/// failure on one side never aborts the other. Completed stores are cached by
/// fingerprint and repeated stores return the cached outcome unchanged.
/// Concurrent stores of the same fingerprint are not coalesced.
#[derive(Debug)]
pub struct DualWriteCoordinator {
    primary: Arc<dyn PrimaryBackend>,
    secondary: Arc<dyn SecondaryBackend>,
    primary_executor: RetryExecutor,
    secondary_executor: RetryExecutor,
    outcome_cache: Arc<dyn Cache>,
    read_cache: Arc<dyn Cache>,
    fingerprinter: Fingerprinter,
    config: DualWriteConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl DualWriteCoordinator {
    pub fn new(deps: DualWriteDeps, config: DualWriteConfig) -> Self {
        Self {
            primary: deps.primary,
            secondary: deps.secondary,
            primary_executor: deps.primary_executor,
            secondary_executor: deps.secondary_executor,
            outcome_cache: deps.outcome_cache,
            read_cache: deps.read_cache,
            fingerprinter: Fingerprinter::new(config.discriminating_keys.iter().cloned()),
            config,
            metrics: Arc::new(NoopMetricsSink),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    pub fn config(&self) -> &DualWriteConfig {
        &self.config
    }

    /// Stores an item in both backends
    ///
    /// Returns the cached outcome for an already stored fingerprint without
    /// touching either backend. Fails with `AggregatedStorageFailure` only when
    /// both writes fail.
    pub async fn store(&self, item: StorableItem) -> Result<StorageOutcome, CoreError> {
        let fingerprint = self.fingerprinter.fingerprint_item(&item);
        let cache_key = outcome_key(&fingerprint);

        match self.outcome_cache.get::<StorageOutcome>(&cache_key) {
            Ok(Some(outcome)) => {
                debug!(fingerprint = %fingerprint, item_id = %outcome.item_id, "Store short-circuited by cached outcome");
                return Ok(outcome);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "Discarding unreadable cached outcome");
                self.outcome_cache.delete(&cache_key);
            }
        }

        let id = item
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut item = item.with_id(id.clone());
        item.set_fingerprint(fingerprint.clone());

        let started_at = Utc::now();
        let started = Instant::now();

        let ((primary_result, primary_latency), (secondary_result, secondary_latency)) =
            future::join(self.write_primary(&item), self.write_secondary(&item)).await;

        let backends = vec![
            self.backend_outcome(self.primary.name(), primary_result.as_ref().err(), primary_latency),
            self.backend_outcome(self.secondary.name(), secondary_result.as_ref().err(), secondary_latency),
        ];

        let status = OverallStatus::from_results(&[primary_result.is_ok(), secondary_result.is_ok()]);
        self.metrics.storage_outcome(status);

        let item_id = match (primary_result, secondary_result) {
            (Err(primary_error), Err(secondary_error)) => {
                error!(
                    item_id = %id,
                    fingerprint = %fingerprint,
                    primary_error = %primary_error,
                    secondary_error = %secondary_error,
                    "Store failed on every backend"
                );
                return Err(CoreError::aggregated(primary_error, secondary_error));
            }
            (Ok(primary_id), _) => primary_id,
            (Err(_), Ok(())) => id,
        };

        let outcome = StorageOutcome {
            item_id,
            fingerprint,
            status,
            backends,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        if status == OverallStatus::PartialSuccess {
            let failed: Vec<&str> = outcome
                .failed_backends()
                .map(|backend| backend.backend.as_str())
                .collect();
            warn!(
                item_id = %outcome.item_id,
                failed_backends = ?failed,
                "Store partially succeeded"
            );
        } else {
            info!(item_id = %outcome.item_id, duration_ms = outcome.duration_ms, "Stored item");
        }

        if let Err(e) = self.outcome_cache.set(&cache_key, &outcome) {
            warn!(item_id = %outcome.item_id, error = %e, "Failed to cache store outcome");
        }
        self.read_cache.delete(&read_key(&outcome.item_id));

        Ok(outcome)
    }

    /// Applies changes to an item in the primary backend
    ///
    /// Backend failures are reported as `false`. Cache entries for the item
    /// and both its old and new fingerprints are dropped after the write
    /// attempt regardless of its result.
    pub async fn update(&self, id: &str, changes: ItemChanges) -> bool {
        let current = match self.primary_executor.execute(|| self.primary.read(id)).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!(item_id = %id, "Update skipped, item not found");
                return false;
            }
            Err(e) => {
                warn!(item_id = %id, error = %e, "Update failed reading current item");
                return false;
            }
        };

        let old_fingerprint = current
            .fingerprint()
            .map(str::to_string)
            .unwrap_or_else(|| self.fingerprinter.fingerprint_item(&current));

        let mut updated = current;
        updated.apply_changes(&changes, self.config.version_history_limit);

        let new_fingerprint = self.fingerprinter.fingerprint_item(&updated);
        updated.set_fingerprint(new_fingerprint.clone());

        let result = self
            .primary_executor
            .execute(|| self.primary.update(id, &updated))
            .await;

        self.read_cache.delete(&read_key(id));
        self.outcome_cache.delete(&outcome_key(&old_fingerprint));
        self.outcome_cache.delete(&outcome_key(&new_fingerprint));

        match result {
            Ok(true) => {
                info!(item_id = %id, version = updated.version(), reason = %changes.reason, "Updated item");
                true
            }
            Ok(false) => {
                debug!(item_id = %id, "Update matched no item");
                false
            }
            Err(e) => {
                warn!(item_id = %id, error = %e, "Update failed");
                false
            }
        }
    }

    /// Reads an item through the read cache
    ///
    /// A primary backend failure is returned as is; the secondary backend is
    /// never consulted.
    pub async fn get(&self, id: &str) -> Result<Option<StorableItem>, CoreError> {
        let key = read_key(id);

        match self.read_cache.get::<StorableItem>(&key) {
            Ok(Some(item)) => return Ok(Some(item)),
            Ok(None) => {}
            Err(e) => {
                warn!(item_id = %id, error = %e, "Discarding unreadable cached item");
                self.read_cache.delete(&key);
            }
        }

        let item = self.primary_executor.execute(|| self.primary.read(id)).await?;

        if let Some(item) = &item {
            if let Err(e) = self.read_cache.set(&key, item) {
                warn!(item_id = %id, error = %e, "Failed to cache item");
            }
        }

        Ok(item)
    }

    async fn write_primary(&self, item: &StorableItem) -> (Result<String, CoreError>, Duration) {
        let started = Instant::now();
        let result = self.primary_executor.execute(|| self.primary.write(item)).await;
        (result, started.elapsed())
    }

    async fn write_secondary(&self, item: &StorableItem) -> (Result<(), CoreError>, Duration) {
        let started = Instant::now();
        let result = self
            .secondary_executor
            .execute(|| self.secondary.write(item))
            .await;
        (result, started.elapsed())
    }

    fn backend_outcome(&self, name: &str, error: Option<&CoreError>, latency: Duration) -> BackendOutcome {
        self.metrics.backend_latency(name, latency, error.is_none());

        BackendOutcome {
            backend: name.to_string(),
            success: error.is_none(),
            error: error.map(ToString::to_string),
            error_kind: error.map(|e| e.code().to_string()),
            latency_ms: latency.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheConfig;
    use crate::domain::resilience::ResilienceProfile;
    use crate::domain::traits::MockMetricsSink;
    use crate::domain::ErrorKind;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::registry::Registry;
    use crate::infrastructure::storage::{InMemoryPrimaryBackend, InMemorySecondaryBackend};

    struct Harness {
        coordinator: DualWriteCoordinator,
        primary: Arc<InMemoryPrimaryBackend>,
        secondary: Arc<InMemorySecondaryBackend>,
        outcome_cache: Arc<InMemoryCache>,
        read_cache: Arc<InMemoryCache>,
        clock: Arc<ManualClock>,
    }

    fn harness_with(
        primary: InMemoryPrimaryBackend,
        secondary: InMemorySecondaryBackend,
        config: DualWriteConfig,
    ) -> Harness {
        harness_with_profile(primary, secondary, config, ResilienceProfile::storage())
    }

    fn harness_with_profile(
        primary: InMemoryPrimaryBackend,
        secondary: InMemorySecondaryBackend,
        config: DualWriteConfig,
        mut profile: ResilienceProfile,
    ) -> Harness {
        let clock = Arc::new(ManualClock::new());
        let registry = Registry::new(clock.clone(), Arc::new(NoopMetricsSink));

        profile.retry = profile.retry.with_jitter(false);

        let primary = Arc::new(primary);
        let secondary = Arc::new(secondary);
        let outcome_cache = registry
            .cache("outcomes", &CacheConfig::new(100).with_ttl(Duration::from_secs(3600)))
            .unwrap();
        let read_cache = registry.cache("reads", &CacheConfig::new(100)).unwrap();

        let deps = DualWriteDeps {
            primary: primary.clone(),
            secondary: secondary.clone(),
            primary_executor: registry.executor("storage:primary", &profile).unwrap(),
            secondary_executor: registry.executor("storage:secondary", &profile).unwrap(),
            outcome_cache: outcome_cache.clone(),
            read_cache: read_cache.clone(),
        };

        Harness {
            coordinator: DualWriteCoordinator::new(deps, config),
            primary,
            secondary,
            outcome_cache,
            read_cache,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(
            InMemoryPrimaryBackend::default(),
            InMemorySecondaryBackend::default(),
            DualWriteConfig::default(),
        )
    }

    fn item(content: &str) -> StorableItem {
        StorableItem::new(content)
            .with_metadata("source", "upload")
            .with_tags(["spanish"])
    }

    #[tokio::test]
    async fn test_store_writes_both_backends() {
        let h = harness();

        let outcome = h.coordinator.store(item("hola mundo")).await.unwrap();

        assert_eq!(outcome.status, OverallStatus::FullSuccess);
        assert_eq!(outcome.backends.len(), 2);
        assert!(outcome.backends.iter().all(|b| b.success && b.error.is_none()));

        let primary_item = h.primary.stored(&outcome.item_id).unwrap();
        let secondary_item = h.secondary.stored(&outcome.item_id).unwrap();
        assert_eq!(primary_item.fingerprint(), Some(outcome.fingerprint.as_str()));
        assert_eq!(secondary_item.id(), Some(outcome.item_id.as_str()));
    }

    #[tokio::test]
    async fn test_identical_store_is_idempotent() {
        let h = harness();

        let first = h.coordinator.store(item("hola mundo")).await.unwrap();
        let second = h.coordinator.store(item("hola mundo")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.primary.write_calls(), 1);
        assert_eq!(h.secondary.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_variant_is_idempotent() {
        let h = harness();

        let first = h.coordinator.store(item("hola mundo")).await.unwrap();
        let second = h.coordinator.store(item("  hola\n\tmundo ")).await.unwrap();

        assert_eq!(first.item_id, second.item_id);
        assert_eq!(h.primary.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_discriminating_metadata_stores_separately() {
        let h = harness();

        h.coordinator.store(item("hola")).await.unwrap();
        h.coordinator
            .store(item("hola").with_metadata("source", "import"))
            .await
            .unwrap();

        assert_eq!(h.primary.write_calls(), 2);
        assert_eq!(h.primary.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_success_is_returned_and_cached() {
        let h = harness();
        h.secondary.fail_always(ErrorKind::AuthFailure);

        let outcome = h.coordinator.store(item("hola")).await.unwrap();

        assert_eq!(outcome.status, OverallStatus::PartialSuccess);
        let secondary = outcome.backend("secondary").unwrap();
        assert!(!secondary.success);
        assert_eq!(secondary.error_kind.as_deref(), Some("auth_failure"));
        assert_eq!(h.secondary.write_calls(), 1);
        assert_eq!(h.outcome_cache.len(), 1);

        let again = h.coordinator.store(item("hola")).await.unwrap();
        assert_eq!(again, outcome);
        assert_eq!(h.primary.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_only_failure_keeps_assigned_id() {
        let h = harness();
        h.primary.fail_always(ErrorKind::QuotaExceeded);

        let outcome = h
            .coordinator
            .store(item("hola").with_id("fixed-id"))
            .await
            .unwrap();

        assert_eq!(outcome.status, OverallStatus::PartialSuccess);
        assert_eq!(outcome.item_id, "fixed-id");
        assert!(h.secondary.stored("fixed-id").is_some());
    }

    #[tokio::test]
    async fn test_total_failure_raises_and_caches_nothing() {
        let h = harness();
        h.primary.fail_always(ErrorKind::IntegrityViolation);
        h.secondary.fail_always(ErrorKind::AuthFailure);

        let error = h.coordinator.store(item("hola")).await.unwrap_err();

        match error {
            CoreError::AggregatedStorageFailure { primary, secondary } => {
                assert_eq!(primary.kind(), Some(ErrorKind::IntegrityViolation));
                assert_eq!(secondary.kind(), Some(ErrorKind::AuthFailure));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.outcome_cache.is_empty());

        h.primary.heal();
        h.secondary.heal();
        h.coordinator.store(item("hola")).await.unwrap();
        assert_eq!(h.primary.write_calls(), 2);
    }

    #[tokio::test]
    async fn test_primary_recovers_within_max_attempts() {
        let h = harness();
        h.primary.fail_next(2, ErrorKind::Connectivity);

        let outcome = h.coordinator.store(item("hola")).await.unwrap();

        assert_eq!(outcome.status, OverallStatus::FullSuccess);
        assert_eq!(h.primary.write_calls(), 3);
        assert_eq!(h.secondary.write_calls(), 1);
        assert_eq!(
            h.clock.sleeps(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn test_unreadable_cached_outcome_is_ignored() {
        let h = harness();
        let fingerprint = h.coordinator.fingerprinter().fingerprint_item(&item("hola"));
        h.outcome_cache.set_raw(&outcome_key(&fingerprint), "not an outcome".to_string());

        let outcome = h.coordinator.store(item("hola")).await.unwrap();

        assert_eq!(outcome.status, OverallStatus::FullSuccess);
        assert_eq!(h.primary.write_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_reads_through_cache() {
        let h = harness();
        let outcome = h.coordinator.store(item("hola")).await.unwrap();

        let first = h.coordinator.get(&outcome.item_id).await.unwrap().unwrap();
        let second = h.coordinator.get(&outcome.item_id).await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.content(), "hola");
        assert_eq!(h.primary.read_calls(), 1);
        assert_eq!(h.read_cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let h = harness();

        assert!(h.coordinator.get("missing").await.unwrap().is_none());
        assert!(h.read_cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_surfaces_primary_failure() {
        let h = harness();
        h.primary.fail_always(ErrorKind::Timeout);

        let error = h.coordinator.get("any").await.unwrap_err();

        assert_eq!(error.kind(), Some(ErrorKind::Timeout));
        assert_eq!(h.primary.read_calls(), 3);
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_reads() {
        let h = harness();
        let outcome = h.coordinator.store(item("hola")).await.unwrap();
        let before = h.coordinator.get(&outcome.item_id).await.unwrap().unwrap();
        assert_eq!(before.content(), "hola");

        let changes = ItemChanges::new("corrected translation").with_content("adios");
        assert!(h.coordinator.update(&outcome.item_id, changes).await);

        let after = h.coordinator.get(&outcome.item_id).await.unwrap().unwrap();
        assert_eq!(after.content(), "adios");
        assert_eq!(after.version(), 2);
        assert_eq!(after.version_history().len(), 1);
        assert_eq!(after.version_history()[0].reason, "corrected translation");
        assert_ne!(after.fingerprint(), before.fingerprint());
    }

    #[tokio::test]
    async fn test_update_invalidates_old_fingerprint_outcome() {
        let h = harness();
        let outcome = h.coordinator.store(item("hola")).await.unwrap();

        let changes = ItemChanges::new("edit").with_content("adios");
        assert!(h.coordinator.update(&outcome.item_id, changes).await);
        assert!(h.outcome_cache.is_empty());

        h.coordinator.store(item("hola")).await.unwrap();
        assert_eq!(h.primary.write_calls(), 2);
    }

    #[tokio::test]
    async fn test_version_history_is_bounded() {
        let h = harness_with(
            InMemoryPrimaryBackend::default(),
            InMemorySecondaryBackend::default(),
            DualWriteConfig::default().with_version_history_limit(2),
        );
        let outcome = h.coordinator.store(item("v1")).await.unwrap();

        for version in 2..=4 {
            let changes = ItemChanges::new(format!("edit {}", version)).with_content(format!("v{}", version));
            assert!(h.coordinator.update(&outcome.item_id, changes).await);
        }

        let stored = h.primary.stored(&outcome.item_id).unwrap();
        assert_eq!(stored.version(), 4);
        let versions: Vec<u32> = stored.version_history().iter().map(|entry| entry.version).collect();
        assert_eq!(versions, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_update_unknown_item_is_false() {
        let h = harness();

        assert!(!h.coordinator.update("missing", ItemChanges::new("edit")).await);
        assert_eq!(h.primary.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_read_failure_is_false() {
        let h = harness();
        let outcome = h.coordinator.store(item("hola")).await.unwrap();
        h.coordinator.get(&outcome.item_id).await.unwrap();
        h.primary.fail_always(ErrorKind::AuthFailure);

        let updated = h
            .coordinator
            .update(&outcome.item_id, ItemChanges::new("edit").with_content("adios"))
            .await;

        assert!(!updated);
        assert_eq!(h.primary.update_calls(), 0);
        assert_eq!(h.primary.stored(&outcome.item_id).unwrap().content(), "hola");
    }

    #[tokio::test]
    async fn test_update_write_failure_is_false_and_invalidates() {
        let h = harness();
        let outcome = h.coordinator.store(item("hola")).await.unwrap();
        h.coordinator.get(&outcome.item_id).await.unwrap();
        assert_eq!(h.read_cache.len(), 1);
        assert_eq!(h.outcome_cache.len(), 1);
        h.primary.fail_updates(ErrorKind::Connectivity);

        let updated = h
            .coordinator
            .update(&outcome.item_id, ItemChanges::new("edit").with_content("adios"))
            .await;

        assert!(!updated);
        assert_eq!(h.primary.update_calls(), 3);
        assert!(h.read_cache.is_empty());
        assert!(h.outcome_cache.is_empty());

        let reads_before = h.primary.read_calls();
        let current = h.coordinator.get(&outcome.item_id).await.unwrap().unwrap();
        assert_eq!(current.content(), "hola");
        assert_eq!(h.primary.read_calls(), reads_before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backends_sharing_a_profile_limit_both_write() {
        let h = harness_with_profile(
            InMemoryPrimaryBackend::default().with_latency(Duration::from_millis(10)),
            InMemorySecondaryBackend::default().with_latency(Duration::from_millis(10)),
            DualWriteConfig::default(),
            ResilienceProfile::storage().with_concurrency_limit(1),
        );

        let outcome = h.coordinator.store(item("hola")).await.unwrap();

        assert_eq!(outcome.status, OverallStatus::FullSuccess);
        assert_eq!(h.primary.write_calls(), 1);
        assert_eq!(h.secondary.write_calls(), 1);
        assert!(h.secondary.stored(&outcome.item_id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_writes_run_concurrently() {
        let h = harness_with(
            InMemoryPrimaryBackend::default().with_latency(Duration::from_millis(100)),
            InMemorySecondaryBackend::default().with_latency(Duration::from_millis(100)),
            DualWriteConfig::default(),
        );
        let started = tokio::time::Instant::now();

        h.coordinator.store(item("hola")).await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_outcomes_are_reported_to_metrics() {
        let mut metrics = MockMetricsSink::new();
        metrics
            .expect_backend_latency()
            .withf(|backend, _, success| backend == "primary" && *success)
            .times(1)
            .return_const(());
        metrics
            .expect_backend_latency()
            .withf(|backend, _, success| backend == "secondary" && !*success)
            .times(1)
            .return_const(());
        metrics
            .expect_storage_outcome()
            .withf(|status| *status == OverallStatus::PartialSuccess)
            .times(1)
            .return_const(());

        let h = harness();
        h.secondary.fail_always(ErrorKind::IntegrityViolation);
        let coordinator = h.coordinator.with_metrics(Arc::new(metrics));

        let outcome = coordinator.store(item("hola")).await.unwrap();
        assert_eq!(outcome.status, OverallStatus::PartialSuccess);
    }
}
