//! Domain layer - Core types, traits and configuration

pub mod cache;
pub mod error;
pub mod resilience;
pub mod storage;
pub mod traits;

pub use cache::{
    Cache, CacheConfig, CacheEntry, CacheExt, CacheKeyGenerator, CacheKeyParams, CacheStats,
    EvictionPolicy, Sha256KeyGenerator,
};
pub use error::{CoreError, ErrorKind, ProviderError};
pub use resilience::{
    CircuitBreakerConfig, CircuitBreakerState, CircuitState, ResilienceProfile, RetryConfig,
};
pub use storage::{
    BackendOutcome, Fingerprinter, ItemChanges, OverallStatus, PrimaryBackend, SecondaryBackend,
    StorableItem, StorageOutcome, VersionHistoryEntry,
};
pub use traits::{Clock, MetricsSink, NoopMetricsSink};
