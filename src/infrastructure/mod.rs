//! Infrastructure layer - Implementations of the domain contracts

pub mod cache;
pub mod clock;
pub mod logging;
pub mod observability;
pub mod registry;
pub mod resilience;
pub mod services;
pub mod storage;

pub use cache::{CacheFactory, InMemoryCache};
pub use clock::{ManualClock, SystemClock};
pub use registry::Registry;
pub use resilience::{CircuitBreaker, ConcurrencyLimiter, ErrorClassifier, RetryExecutor};
pub use services::{DualWriteConfig, DualWriteCoordinator, DualWriteDeps};
pub use storage::{InMemoryPrimaryBackend, InMemorySecondaryBackend};
