//! Resilience infrastructure - Breakers, classification, retries and backpressure

mod circuit_breaker;
mod classifier;
mod limiter;
mod retry;

pub use circuit_breaker::CircuitBreaker;
pub use classifier::{kind_from_status, parse_retry_after, Classification, ErrorClassifier};
pub use limiter::ConcurrencyLimiter;
pub use retry::{RetryExecutor, RetryExecutorBuilder};
