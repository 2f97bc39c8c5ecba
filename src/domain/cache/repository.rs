//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use super::policy::EvictionPolicy;
use crate::domain::CoreError;

/// Counters and sizing for one named cache
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub name: String,
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub hit_rate: f64,
    pub ttl: Option<Duration>,
    pub eviction_policy: EvictionPolicy,
}

impl CacheStats {
    /// Hit rate in `[0, 1]`, zero before the first lookup
    pub fn compute_hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Bounded key-value cache storing serialized values
///
/// Operations never suspend and never fail for a missing key. The trait stores
/// JSON strings to stay dyn-compatible; use [`CacheExt`] for typed access.
pub trait Cache: Send + Sync + Debug {
    /// Name the cache is registered under
    fn name(&self) -> &str;

    /// Gets a raw value, updating access metadata and hit/miss counters
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Inserts or replaces a raw value, evicting one entry first when full
    fn set_raw(&self, key: &str, value: String);

    /// Deletes a value, returns true if it was present
    fn delete(&self, key: &str) -> bool;

    /// Checks for a live entry without touching access metadata or counters
    fn contains(&self, key: &str) -> bool;

    /// Removes every entry and resets the counters
    fn clear(&self);

    /// Number of entries currently held (expired ones included until purged)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all expired entries, returns how many were removed
    fn purge_expired(&self) -> usize;

    fn stats(&self) -> CacheStats;

    /// Resets hit/miss/eviction counters without touching entries
    fn reset_stats(&self);
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<V>(&self, key: &str) -> Result<Option<V>, CoreError>
    where
        V: DeserializeOwned,
    {
        match self.get_raw(key) {
            Some(data) => {
                let value: V = serde_json::from_str(&data).map_err(|e| {
                    CoreError::serialization(format!("Failed to deserialize cache value: {}", e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Sets a typed value in the cache
    fn set<V>(&self, key: &str, value: &V) -> Result<(), CoreError>
    where
        V: Serialize + ?Sized,
    {
        let data = serde_json::to_string(value).map_err(|e| {
            CoreError::serialization(format!("Failed to serialize cache value: {}", e))
        })?;
        self.set_raw(key, data);
        Ok(())
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_before_lookups() {
        assert_eq!(CacheStats::compute_hit_rate(0, 0), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::compute_hit_rate(3, 1), 0.75);
    }
}
