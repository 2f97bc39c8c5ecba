//! Storage backend traits
//!
//! Backends surface raw driver errors undecorated as `anyhow::Error`; the
//! retry layer classifies them.

use std::fmt::Debug;

use async_trait::async_trait;

use super::item::StorableItem;

/// Primary (structured) store, the source of truth for reads
#[async_trait]
pub trait PrimaryBackend: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Persists the item, returns its id
    async fn write(&self, item: &StorableItem) -> anyhow::Result<String>;

    async fn read(&self, id: &str) -> anyhow::Result<Option<StorableItem>>;

    /// Replaces the stored item, returns false when the id is unknown
    async fn update(&self, id: &str, item: &StorableItem) -> anyhow::Result<bool>;
}

/// Secondary (document) store, written alongside the primary
#[async_trait]
pub trait SecondaryBackend: Send + Sync + Debug {
    fn name(&self) -> &str;

    async fn write(&self, item: &StorableItem) -> anyhow::Result<()>;
}
