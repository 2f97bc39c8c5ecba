use std::fmt::Debug;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Monotonic time source with a non-blocking sleep
///
/// Backoff delays and circuit breaker recovery windows are measured through
/// this trait so tests can drive time explicitly. Per-attempt timeouts are
/// not: they run on `tokio::time`, so tests exercising them pause the tokio
/// clock instead.
#[async_trait]
pub trait Clock: Send + Sync + Debug {
    /// Returns the current monotonic instant
    fn now(&self) -> Instant;

    /// Suspends the current task for the given duration
    async fn sleep(&self, duration: Duration);

    /// Time elapsed since an earlier instant, saturating at zero
    fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}
