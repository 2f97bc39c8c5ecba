use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tracing::warn;

use crate::domain::CoreError;

/// Per-operation-class concurrency bound that rejects instead of queueing
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    class: String,
    limit: usize,
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    pub fn new(class: impl Into<String>, limit: usize) -> Result<Self, CoreError> {
        let class = class.into();

        if limit == 0 {
            return Err(CoreError::configuration(format!(
                "concurrency limit for '{}' must be greater than zero",
                class
            )));
        }

        Ok(Self {
            class,
            limit,
            semaphore: Arc::new(Semaphore::new(limit)),
        })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Takes a permit held until dropped, or rejects when none are free
    pub fn try_acquire(&self) -> Result<OwnedSemaphorePermit, CoreError> {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => Ok(permit),
            Err(TryAcquireError::NoPermits) | Err(TryAcquireError::Closed) => {
                warn!(class = %self.class, limit = self.limit, "Concurrency limit exceeded");
                Err(CoreError::concurrency_limit(&self.class, self.limit))
            }
        }
    }
}
