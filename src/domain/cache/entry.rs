//! Cache entry bookkeeping

use std::time::{Duration, Instant};

/// A single cached value with its access metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub inserted_at: Instant,
    pub last_access_at: Instant,
    pub access_count: u64,
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: String, now: Instant, ttl: Option<Duration>) -> Self {
        Self {
            key: key.into(),
            value,
            inserted_at: now,
            last_access_at: now,
            access_count: 0,
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    /// An entry is expired once `now` reaches its deadline
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_access_at = now;
        self.access_count += 1;
    }

    /// Replaces the value and restarts the TTL window
    pub fn replace(&mut self, value: String, now: Instant, ttl: Option<Duration>) {
        self.value = value;
        self.inserted_at = now;
        self.last_access_at = now;
        self.expires_at = ttl.map(|ttl| now + ttl);
    }

    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
