//! Content fingerprinting for idempotency keys

use std::collections::{BTreeMap, BTreeSet};

use super::item::StorableItem;
use crate::domain::cache::{CacheKeyGenerator, CacheKeyParams, Sha256KeyGenerator};

/// Metadata keys that distinguish otherwise identical content by default
pub const DEFAULT_DISCRIMINATING_KEYS: &[&str] = &["source", "source_type", "content_type", "user_id"];

/// Derives a deterministic fingerprint from normalized content and selected metadata
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    discriminating_keys: BTreeSet<String>,
    generator: Sha256KeyGenerator,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(DEFAULT_DISCRIMINATING_KEYS.iter().copied())
    }
}

impl Fingerprinter {
    pub fn new<I, S>(discriminating_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            discriminating_keys: discriminating_keys.into_iter().map(Into::into).collect(),
            generator: Sha256KeyGenerator::new(),
        }
    }

    pub fn discriminating_keys(&self) -> impl Iterator<Item = &str> {
        self.discriminating_keys.iter().map(String::as_str)
    }

    pub fn fingerprint(&self, content: &str, metadata: &BTreeMap<String, serde_json::Value>) -> String {
        let mut params = CacheKeyParams::new(normalize_content(content));

        for key in &self.discriminating_keys {
            if let Some(value) = metadata.get(key) {
                params = params.with_component(key.clone(), value.to_string());
            }
        }

        self.generator.generate(&params)
    }

    pub fn fingerprint_item(&self, item: &StorableItem) -> String {
        self.fingerprint(item.content(), item.metadata())
    }
}

/// Trims and collapses every whitespace run to a single space
pub fn normalize_content(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}
