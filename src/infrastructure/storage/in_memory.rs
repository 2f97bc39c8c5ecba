//! In-memory backend implementations
//!
//! Useful for testing and development. Data is lost when the process terminates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::storage::{PrimaryBackend, SecondaryBackend, StorableItem};
use crate::domain::ErrorKind;

use super::failure::FailureInjector;

/// Structured primary backend keyed by item id
#[derive(Debug)]
pub struct InMemoryPrimaryBackend {
    name: String,
    items: RwLock<HashMap<String, StorableItem>>,
    failures: FailureInjector,
    update_failures: FailureInjector,
    latency: Option<Duration>,
    write_calls: AtomicU32,
    read_calls: AtomicU32,
    update_calls: AtomicU32,
}

impl Default for InMemoryPrimaryBackend {
    fn default() -> Self {
        Self::new("primary")
    }
}

impl InMemoryPrimaryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: RwLock::new(HashMap::new()),
            failures: FailureInjector::default(),
            update_failures: FailureInjector::default(),
            latency: None,
            write_calls: AtomicU32::new(0),
            read_calls: AtomicU32::new(0),
            update_calls: AtomicU32::new(0),
        }
    }

    /// Simulated I/O latency applied to every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next(&self, count: u32, kind: ErrorKind) {
        self.failures.fail_next(count, kind);
    }

    pub fn fail_always(&self, kind: ErrorKind) {
        self.failures.fail_always(kind);
    }

    /// Fails every `update` call while reads and writes keep working
    pub fn fail_updates(&self, kind: ErrorKind) {
        self.update_failures.fail_always(kind);
    }

    pub fn heal(&self) {
        self.failures.heal();
        self.update_failures.heal();
    }

    pub fn write_calls(&self) -> u32 {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> u32 {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> u32 {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Direct lookup that bypasses failure injection and call counting
    pub fn stored(&self, id: &str) -> Option<StorableItem> {
        self.items.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    async fn simulate_call(&self) -> anyhow::Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.failures.next_failure(&self.name) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PrimaryBackend for InMemoryPrimaryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&self, item: &StorableItem) -> anyhow::Result<String> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        let id = item
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.items
            .write()
            .insert(id.clone(), item.clone().with_id(id.clone()));

        Ok(id)
    }

    async fn read(&self, id: &str) -> anyhow::Result<Option<StorableItem>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        Ok(self.items.read().get(id).cloned())
    }

    async fn update(&self, id: &str, item: &StorableItem) -> anyhow::Result<bool> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_call().await?;

        if let Some(error) = self.update_failures.next_failure(&self.name) {
            return Err(error);
        }

        let mut items = self.items.write();

        match items.get_mut(id) {
            Some(existing) => {
                *existing = item.clone().with_id(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Document-oriented secondary backend
#[derive(Debug)]
pub struct InMemorySecondaryBackend {
    name: String,
    documents: RwLock<HashMap<String, StorableItem>>,
    failures: FailureInjector,
    latency: Option<Duration>,
    write_calls: AtomicU32,
}

impl Default for InMemorySecondaryBackend {
    fn default() -> Self {
        Self::new("secondary")
    }
}

impl InMemorySecondaryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(HashMap::new()),
            failures: FailureInjector::default(),
            latency: None,
            write_calls: AtomicU32::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next(&self, count: u32, kind: ErrorKind) {
        self.failures.fail_next(count, kind);
    }

    pub fn fail_always(&self, kind: ErrorKind) {
        self.failures.fail_always(kind);
    }

    pub fn heal(&self) {
        self.failures.heal();
    }

    pub fn write_calls(&self) -> u32 {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self, id: &str) -> Option<StorableItem> {
        self.documents.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl SecondaryBackend for InMemorySecondaryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&self, item: &StorableItem) -> anyhow::Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.failures.next_failure(&self.name) {
            return Err(error);
        }

        let id = item
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.documents.write().insert(id, item.clone());
        Ok(())
    }
}
