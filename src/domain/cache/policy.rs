//! Eviction policies and per-instance cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::CoreError;

/// Eviction policy selectable per cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Least recently used entry is evicted when full
    #[default]
    Lru,
    /// Expired entries are purged autonomously, LRU governs remaining capacity
    TtlLru,
    /// LRU/TTL eviction plus a per-key frequency index for diagnostics
    Smart,
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Lru => write!(f, "lru"),
            EvictionPolicy::TtlLru => write!(f, "ttl_lru"),
            EvictionPolicy::Smart => write!(f, "smart"),
        }
    }
}

impl std::str::FromStr for EvictionPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "ttl_lru" | "ttl-lru" | "ttl" => Ok(EvictionPolicy::TtlLru),
            "smart" | "adaptive" => Ok(EvictionPolicy::Smart),
            _ => Err(CoreError::configuration(format!(
                "Unknown eviction policy: {}. Valid policies: lru, ttl_lru, smart",
                s
            ))),
        }
    }
}

/// Configuration for a single cache instance
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_size: usize,
    /// Entry lifetime, `None` disables expiry
    pub ttl: Option<Duration>,
    pub eviction_policy: EvictionPolicy,
    /// Mutations between prunes of the smart-policy access index
    pub prune_interval: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1_000,
            ttl: None,
            eviction_policy: EvictionPolicy::Lru,
            prune_interval: 100,
        }
    }
}

impl CacheConfig {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    pub fn with_prune_interval(mut self, interval: u32) -> Self {
        self.prune_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_size == 0 {
            return Err(CoreError::configuration(
                "cache max_size must be greater than zero",
            ));
        }

        if self.ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(CoreError::configuration("cache ttl must be greater than zero"));
        }

        if self.eviction_policy == EvictionPolicy::TtlLru && self.ttl.is_none() {
            return Err(CoreError::configuration(
                "ttl_lru eviction policy requires a ttl",
            ));
        }

        if self.prune_interval == 0 {
            return Err(CoreError::configuration(
                "cache prune_interval must be greater than zero",
            ));
        }

        Ok(())
    }
}
