//! Storable item entity and version history

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of version history entries kept per item
pub const DEFAULT_VERSION_HISTORY_LIMIT: usize = 10;

/// One audited revision of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionHistoryEntry {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// An item persisted to both storage backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorableItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    content: String,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "initial_version")]
    version: u32,
    /// Bounded audit trail, oldest first
    #[serde(default)]
    version_history: Vec<VersionHistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn initial_version() -> u32 {
    1
}

impl StorableItem {
    pub fn new(content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            content: content.into(),
            metadata: BTreeMap::new(),
            tags: Vec::new(),
            version: initial_version(),
            version_history: Vec::new(),
            fingerprint: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata_map(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    // Getters

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn version_history(&self) -> &[VersionHistoryEntry] {
        &self.version_history
    }

    /// Fingerprint recorded when the item was last stored
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.fingerprint = Some(fingerprint.into());
    }

    /// Applies changes, bumps the version and appends a bounded history entry
    pub fn apply_changes(&mut self, changes: &ItemChanges, history_limit: usize) {
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }

        for (key, value) in &changes.metadata {
            if value.is_null() {
                self.metadata.remove(key);
            } else {
                self.metadata.insert(key.clone(), value.clone());
            }
        }

        if let Some(tags) = &changes.tags {
            self.tags = tags.clone();
        }

        self.record_version(changes.reason.clone(), history_limit);
    }

    /// Increments the version and appends to the history, dropping the oldest beyond `limit`
    pub fn record_version(&mut self, reason: impl Into<String>, limit: usize) {
        let now = Utc::now();
        self.version += 1;
        self.updated_at = now;
        self.version_history.push(VersionHistoryEntry {
            version: self.version,
            timestamp: now,
            reason: reason.into(),
        });

        if self.version_history.len() > limit {
            let excess = self.version_history.len() - limit;
            self.version_history.drain(..excess);
        }
    }
}

/// Field-level changes applied by an update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub content: Option<String>,
    /// Merged into existing metadata; a JSON null removes the key
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub tags: Option<Vec<String>>,
    pub reason: String,
}

impl ItemChanges {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}
