//! Cache domain - Bounded caching abstraction layer

mod entry;
mod key;
mod policy;
mod repository;

pub use entry::CacheEntry;
pub use key::{CacheKeyGenerator, CacheKeyParams, Sha256KeyGenerator};
pub use policy::{CacheConfig, EvictionPolicy};
pub use repository::{Cache, CacheExt, CacheStats};
