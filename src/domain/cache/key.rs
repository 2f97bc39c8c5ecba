//! Cache key generation strategies

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Trait for generating cache keys from input data
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates a cache key from the given components
    fn generate(&self, params: &CacheKeyParams) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str, params: &CacheKeyParams) -> String {
        format!("{}:{}", namespace, self.generate(params))
    }
}

/// Parameters for cache key generation
#[derive(Debug, Clone, Default)]
pub struct CacheKeyParams {
    /// Primary identifier (e.g., normalized content)
    pub primary: String,
    /// Secondary components (sorted for consistency)
    pub components: BTreeMap<String, String>,
}

impl CacheKeyParams {
    /// Creates new cache key parameters with a primary identifier
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            components: BTreeMap::new(),
        }
    }

    /// Adds a component to the key parameters
    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }

    /// Creates parameters from a serializable value
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(value)?;
        Ok(Self::new(json))
    }
}

/// Key generator producing SHA-256 hex digests, stable across processes and releases
#[derive(Debug, Clone, Default)]
pub struct Sha256KeyGenerator {
    /// Truncate the digest to 16 hex chars
    use_short_hash: bool,
}

impl Sha256KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that produces short hash keys
    pub fn with_short_hash(mut self) -> Self {
        self.use_short_hash = true;
        self
    }
}

impl CacheKeyGenerator for Sha256KeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        let mut hasher = Sha256::new();

        // Length-prefix every part so "ab"+"c" and "a"+"bc" never collide
        hasher.update((params.primary.len() as u64).to_be_bytes());
        hasher.update(params.primary.as_bytes());

        for (k, v) in &params.components {
            hasher.update(b"\x1f");
            hasher.update((k.len() as u64).to_be_bytes());
            hasher.update(k.as_bytes());
            hasher.update((v.len() as u64).to_be_bytes());
            hasher.update(v.as_bytes());
        }

        let digest = hex::encode(hasher.finalize());

        if self.use_short_hash {
            digest[..16].to_string()
        } else {
            digest
        }
    }
}
