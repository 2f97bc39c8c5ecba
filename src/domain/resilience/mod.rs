//! Resilience domain - circuit breaker and retry configuration

mod breaker;
mod profile;
mod retry;

pub use breaker::{CircuitBreakerConfig, CircuitBreakerState, CircuitState};
pub use profile::ResilienceProfile;
pub use retry::RetryConfig;
