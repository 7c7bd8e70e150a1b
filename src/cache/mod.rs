//! # Cache Coherence Layer
//!
//! Key-value cache behind a store trait, with TTL expiry and prefix-based
//! purge. The cache is a strict performance optimization: the service
//! catches every cache error and falls back to the store of record, so
//! behavior with the cache down is identical to the cached path, only
//! slower.
//!
//! Known consistency gap: a mutation's purge runs after its transaction
//! commits but is not part of it. A reader can observe a stale cached
//! value in the window between commit and purge completion; the cache TTL
//! bounds that staleness.

use std::time::Duration;

use async_trait::async_trait;

pub mod errors;
pub mod keys;
pub mod memory;

pub use errors::{CacheError, CacheResult};
pub use memory::MemoryCache;

/// Key-value cache store contract
///
/// Individual key writes and deletes are atomic on the store side; callers
/// apply no locking of their own.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value by exact key
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a value with a bounded time-to-live
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Drop a single key
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Drop every key starting with `prefix`; returns the number removed
    async fn purge_prefix(&self, prefix: &str) -> CacheResult<u64>;
}
