//! Bounded in-memory cache with pluggable eviction

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::cache::{Cache, CacheConfig, CacheEntry, CacheStats, EvictionPolicy};
use crate::domain::{Clock, CoreError, MetricsSink, NoopMetricsSink};
use crate::infrastructure::clock::SystemClock;

/// Per-key access pattern tracked by the smart policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPattern {
    pub last_access: Instant,
    pub frequency: u64,
}

#[derive(Debug, Default)]
struct AccessTracker {
    patterns: HashMap<String, AccessPattern>,
}

impl AccessTracker {
    fn record(&mut self, key: &str, now: Instant) {
        match self.patterns.get_mut(key) {
            Some(pattern) => {
                pattern.last_access = now;
                pattern.frequency += 1;
            }
            None => {
                self.patterns.insert(
                    key.to_string(),
                    AccessPattern {
                        last_access: now,
                        frequency: 1,
                    },
                );
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

struct CacheState {
    entries: LruCache<String, CacheEntry>,
    counters: Counters,
    tracker: Option<AccessTracker>,
    ops_since_maintenance: u32,
}

enum Lookup {
    Hit(String),
    Expired,
    Miss,
}

/// Thread-safe bounded cache
///
/// Features:
/// - Exact capacity bound, one LRU eviction precedes every over-capacity insert
/// - Optional TTL per instance, expired entries read as misses and are purged
/// - TTL+LRU hybrid purges expired entries before evicting live ones
/// - Smart policy keeps a frequency index for diagnostics
///
/// All mutations on one instance go through a single mutex; nothing here
/// suspends or performs I/O.
pub struct InMemoryCache {
    name: String,
    config: CacheConfig,
    state: Mutex<CacheState>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsSink>,
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

impl InMemoryCache {
    /// Creates a cache using the system clock and no metrics sink
    pub fn new(name: impl Into<String>, config: CacheConfig) -> Result<Self, CoreError> {
        Self::with_collaborators(name, config, Arc::new(SystemClock), Arc::new(NoopMetricsSink))
    }

    pub fn with_collaborators(
        name: impl Into<String>,
        config: CacheConfig,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let tracker = (config.eviction_policy == EvictionPolicy::Smart)
            .then(AccessTracker::default);

        Ok(Self {
            name: name.into(),
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                counters: Counters::default(),
                tracker,
                ops_since_maintenance: 0,
            }),
            config,
            clock,
            metrics,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> Vec<String> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        let state = self.state.lock();

        state
            .entries
            .peek(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }

    /// Snapshot of the smart-policy access index, empty for other policies
    pub fn access_patterns(&self) -> HashMap<String, AccessPattern> {
        self.state
            .lock()
            .tracker
            .as_ref()
            .map(|tracker| tracker.patterns.clone())
            .unwrap_or_default()
    }

    /// Most frequently accessed keys still tracked, highest first
    pub fn hot_keys(&self, limit: usize) -> Vec<String> {
        let mut patterns: Vec<(String, AccessPattern)> = self.access_patterns().into_iter().collect();
        patterns.sort_by(|(ka, a), (kb, b)| b.frequency.cmp(&a.frequency).then_with(|| ka.cmp(kb)));
        patterns.into_iter().take(limit).map(|(key, _)| key).collect()
    }

    fn purges_autonomously(&self) -> bool {
        self.config.ttl.is_some() && self.config.eviction_policy != EvictionPolicy::Lru
    }

    fn purge_expired_locked(&self, state: &mut CacheState, now: Instant) -> usize {
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.entries.pop(key.as_str());
            state.counters.expirations += 1;
            self.metrics.cache_expiration(&self.name);
        }

        if !expired.is_empty() {
            debug!(cache = %self.name, purged = expired.len(), "Purged expired entries");
        }

        expired.len()
    }

    /// Periodic upkeep: autonomous expiry and pruning of the access index
    fn note_operation(&self, state: &mut CacheState, now: Instant) {
        state.ops_since_maintenance += 1;

        if state.ops_since_maintenance < self.config.prune_interval {
            return;
        }

        state.ops_since_maintenance = 0;

        if self.purges_autonomously() {
            self.purge_expired_locked(state, now);
        }

        let entries = &state.entries;

        if let Some(tracker) = state.tracker.as_mut() {
            let before = tracker.patterns.len();
            tracker.patterns.retain(|key, _| entries.contains(key.as_str()));
            let pruned = before - tracker.patterns.len();

            if pruned > 0 {
                debug!(cache = %self.name, pruned, "Pruned access tracking for evicted keys");
            }
        }
    }
}

impl Cache for InMemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let lookup = match state.entries.get_mut(key) {
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => {
                entry.touch(now);
                Lookup::Hit(entry.value.clone())
            }
            None => Lookup::Miss,
        };

        let result = match lookup {
            Lookup::Hit(value) => {
                state.counters.hits += 1;

                if let Some(tracker) = state.tracker.as_mut() {
                    tracker.record(key, now);
                }

                self.metrics.cache_hit(&self.name);
                Some(value)
            }
            Lookup::Expired => {
                state.entries.pop(key);
                state.counters.expirations += 1;
                state.counters.misses += 1;
                self.metrics.cache_expiration(&self.name);
                self.metrics.cache_miss(&self.name);
                None
            }
            Lookup::Miss => {
                state.counters.misses += 1;
                self.metrics.cache_miss(&self.name);
                None
            }
        };

        self.note_operation(state, now);
        result
    }

    fn set_raw(&self, key: &str, value: String) {
        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(entry) = state.entries.get_mut(key) {
            entry.replace(value, now, self.config.ttl);
        } else {
            if state.entries.len() >= self.config.max_size && self.purges_autonomously() {
                self.purge_expired_locked(state, now);
            }

            if state.entries.len() >= self.config.max_size {
                if let Some((evicted, _)) = state.entries.pop_lru() {
                    state.counters.evictions += 1;
                    self.metrics.cache_eviction(&self.name);
                    debug!(cache = %self.name, key = %evicted, "Evicted least recently used entry");
                }
            }

            state
                .entries
                .put(key.to_string(), CacheEntry::new(key, value, now, self.config.ttl));
        }

        if let Some(tracker) = state.tracker.as_mut() {
            tracker.record(key, now);
        }

        self.note_operation(state, now);
    }

    fn delete(&self, key: &str) -> bool {
        self.state.lock().entries.pop(key).is_some()
    }

    fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.counters = Counters::default();
        state.ops_since_maintenance = 0;

        if let Some(tracker) = state.tracker.as_mut() {
            tracker.patterns.clear();
        }
    }

    fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut guard = self.state.lock();
        self.purge_expired_locked(&mut guard, now)
    }

    fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let counters = state.counters;

        CacheStats {
            name: self.name.clone(),
            size: state.entries.len(),
            max_size: self.config.max_size,
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            expirations: counters.expirations,
            hit_rate: CacheStats::compute_hit_rate(counters.hits, counters.misses),
            ttl: self.config.ttl,
            eviction_policy: self.config.eviction_policy,
        }
    }

    fn reset_stats(&self) {
        self.state.lock().counters = Counters::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;
    use crate::infrastructure::clock::ManualClock;

    fn cache_with_clock(config: CacheConfig) -> (InMemoryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = InMemoryCache::with_collaborators(
            "test",
            config,
            clock.clone(),
            Arc::new(NoopMetricsSink),
        )
        .unwrap();
        (cache, clock)
    }

    #[test]
    fn test_lru_scenario() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));

        cache.set("a", &1).unwrap();
        cache.set("b", &2).unwrap();
        assert_eq!(cache.get::<i32>("a").unwrap(), Some(1));
        cache.set("c", &3).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.evictions, 1);
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_size_never_exceeds_max() {
        let (cache, _) = cache_with_clock(CacheConfig::new(5));

        for i in 0..50 {
            cache.set_raw(&format!("key-{}", i), i.to_string());
            assert!(cache.len() <= 5);
        }

        let stats = cache.stats();
        assert_eq!(stats.size, 5);
        assert_eq!(stats.evictions, 45);
    }

    #[test]
    fn test_replacing_existing_key_does_not_evict() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));

        cache.set_raw("a", "1".to_string());
        cache.set_raw("b", "2".to_string());
        cache.set_raw("a", "10".to_string());

        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get_raw("a"), Some("10".to_string()));
        assert_eq!(cache.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_replacement_refreshes_position() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));

        cache.set_raw("a", "1".to_string());
        cache.set_raw("b", "2".to_string());
        cache.set_raw("a", "3".to_string());
        cache.set_raw("c", "4".to_string());

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let config = CacheConfig::new(10).with_ttl(Duration::from_secs(10));
        let (cache, clock) = cache_with_clock(config);

        cache.set_raw("k", "v".to_string());
        clock.advance(Duration::from_secs(10));

        assert_eq!(cache.get_raw("k"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_set_refreshes_ttl() {
        let config = CacheConfig::new(10).with_ttl(Duration::from_secs(10));
        let (cache, clock) = cache_with_clock(config);

        cache.set_raw("k", "v1".to_string());
        clock.advance(Duration::from_secs(8));
        cache.set_raw("k", "v2".to_string());
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get_raw("k"), Some("v2".to_string()));
        assert_eq!(cache.ttl_remaining("k"), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_ttl_lru_purges_expired_before_evicting() {
        let config = CacheConfig::new(2)
            .with_ttl(Duration::from_secs(10))
            .with_eviction_policy(EvictionPolicy::TtlLru);
        let (cache, clock) = cache_with_clock(config);

        cache.set_raw("a", "1".to_string());
        clock.advance(Duration::from_secs(5));
        cache.set_raw("b", "2".to_string());
        clock.advance(Duration::from_secs(6));
        cache.set_raw("c", "3".to_string());

        let stats = cache.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_plain_lru_evicts_even_when_expired_entries_exist() {
        let config = CacheConfig::new(2).with_ttl(Duration::from_secs(10));
        let (cache, clock) = cache_with_clock(config);

        cache.set_raw("a", "1".to_string());
        cache.set_raw("b", "2".to_string());
        clock.advance(Duration::from_secs(11));
        cache.set_raw("c", "3".to_string());

        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_purge_expired() {
        let config = CacheConfig::new(10).with_ttl(Duration::from_secs(5));
        let (cache, clock) = cache_with_clock(config);

        cache.set_raw("a", "1".to_string());
        cache.set_raw("b", "2".to_string());
        clock.advance(Duration::from_secs(3));
        cache.set_raw("c", "3".to_string());
        clock.advance(Duration::from_secs(3));

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.keys(), vec!["c".to_string()]);
    }

    #[test]
    fn test_periodic_maintenance_purges_for_ttl_lru() {
        let config = CacheConfig::new(100)
            .with_ttl(Duration::from_secs(5))
            .with_eviction_policy(EvictionPolicy::TtlLru)
            .with_prune_interval(3);
        let (cache, clock) = cache_with_clock(config);

        cache.set_raw("a", "1".to_string());
        clock.advance(Duration::from_secs(6));
        cache.get_raw("missing");
        cache.get_raw("missing");

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_smart_policy_tracks_frequency() {
        let config = CacheConfig::new(10).with_eviction_policy(EvictionPolicy::Smart);
        let (cache, _) = cache_with_clock(config);

        cache.set_raw("a", "1".to_string());
        cache.set_raw("b", "2".to_string());

        for _ in 0..3 {
            cache.get_raw("b");
        }

        let patterns = cache.access_patterns();
        assert_eq!(patterns.get("a").map(|p| p.frequency), Some(1));
        assert_eq!(patterns.get("b").map(|p| p.frequency), Some(4));
        assert_eq!(cache.hot_keys(1), vec!["b".to_string()]);
    }

    #[test]
    fn test_smart_policy_eviction_follows_lru_order() {
        let config = CacheConfig::new(2).with_eviction_policy(EvictionPolicy::Smart);
        let (cache, _) = cache_with_clock(config);

        cache.set_raw("hot", "1".to_string());
        for _ in 0..10 {
            cache.get_raw("hot");
        }
        cache.set_raw("cold", "2".to_string());
        cache.set_raw("new", "3".to_string());

        assert!(!cache.contains("hot"));
        assert!(cache.contains("cold"));
        assert!(cache.contains("new"));
    }

    #[test]
    fn test_smart_policy_prunes_tracking_for_evicted_keys() {
        let config = CacheConfig::new(2)
            .with_eviction_policy(EvictionPolicy::Smart)
            .with_prune_interval(4);
        let (cache, _) = cache_with_clock(config);

        cache.set_raw("a", "1".to_string());
        cache.set_raw("b", "2".to_string());
        cache.set_raw("c", "3".to_string());
        assert!(cache.access_patterns().contains_key("a"));

        cache.get_raw("c");

        let patterns = cache.access_patterns();
        assert!(!patterns.contains_key("a"));
        assert!(patterns.contains_key("b"));
        assert!(patterns.contains_key("c"));
    }

    #[test]
    fn test_non_smart_policy_has_no_tracking() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));
        cache.set_raw("a", "1".to_string());
        cache.get_raw("a");

        assert!(cache.access_patterns().is_empty());
        assert!(cache.hot_keys(5).is_empty());
    }

    #[test]
    fn test_delete_and_missing_keys() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));

        cache.set_raw("a", "1".to_string());

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert!(!cache.delete("never-set"));
        assert_eq!(cache.get_raw("a"), None);
    }

    #[test]
    fn test_clear_resets_stats() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));

        cache.set_raw("a", "1".to_string());
        cache.get_raw("a");
        cache.get_raw("b");
        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_report_configuration() {
        let config = CacheConfig::new(3).with_ttl(Duration::from_secs(60));
        let (cache, _) = cache_with_clock(config);

        cache.set_raw("a", "1".to_string());
        cache.get_raw("a");
        cache.get_raw("a");
        cache.get_raw("b");
        cache.get_raw("c");

        let stats = cache.stats();
        assert_eq!(stats.name, "test");
        assert_eq!(stats.max_size, 3);
        assert_eq!(stats.ttl, Some(Duration::from_secs(60)));
        assert_eq!(stats.hit_rate, 0.5);

        cache.reset_stats();
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_contains_does_not_count() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));
        cache.set_raw("a", "1".to_string());

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_zero_max_size_is_rejected() {
        let result = InMemoryCache::new("bad", CacheConfig::new(0));
        assert!(matches!(result, Err(CoreError::Configuration { .. })));
    }

    #[test]
    fn test_typed_values_round_trip() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Card {
            front: String,
            back: String,
        }

        let (cache, _) = cache_with_clock(CacheConfig::new(2));
        let card = Card {
            front: "hola".to_string(),
            back: "hello".to_string(),
        };

        cache.set("card", &card).unwrap();
        assert_eq!(cache.get::<Card>("card").unwrap(), Some(card));
    }

    #[test]
    fn test_corrupt_value_is_a_serialization_error() {
        let (cache, _) = cache_with_clock(CacheConfig::new(2));
        cache.set_raw("k", "not json".to_string());

        let result = cache.get::<Vec<u32>>("k");
        assert!(matches!(result, Err(CoreError::Serialization { .. })));
    }

    #[test]
    fn test_concurrent_writers_respect_capacity() {
        let cache = Arc::new(InMemoryCache::new("shared", CacheConfig::new(16)).unwrap());

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let cache = cache.clone();
                scope.spawn(move || {
                    for i in 0..200 {
                        cache.set_raw(&format!("{}-{}", worker, i), i.to_string());
                        cache.get_raw(&format!("{}-{}", worker, i / 2));
                    }
                });
            }
        });

        let stats = cache.stats();
        assert_eq!(stats.size, 16);
        assert_eq!(stats.evictions, 8 * 200 - 16);
    }
}
