//! # Read-Through Cache Composition
//!
//! Named wrappers applied at service construction, replacing behavior
//! that would otherwise hide inside the read methods. Every cache failure
//! is caught here: reads fall through to the loader, writes and purges are
//! logged and dropped. The caller's result never depends on the cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{keys, CacheStore};
use crate::document::{Document, DocumentResult};
use crate::observability::Logger;

/// Time-to-live per cached read operation
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub document: Duration,
    pub search: Duration,
    pub versions: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            document: Duration::from_secs(300),
            search: Duration::from_secs(120),
            versions: Duration::from_secs(300),
        }
    }
}

/// Values that decide for themselves whether they are worth caching
pub trait Cacheable {
    /// Whether a successful read result should be stored
    fn should_cache(&self) -> bool;
}

impl Cacheable for Document {
    fn should_cache(&self) -> bool {
        true
    }
}

impl<T> Cacheable for Vec<T> {
    // Empty result sets are not cached; the next read re-checks the store.
    fn should_cache(&self) -> bool {
        !self.is_empty()
    }
}

/// Fail-open cache front for idempotent reads
#[derive(Clone)]
pub struct ReadCache {
    store: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl ReadCache {
    /// Create a read cache over the given store
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self { store, ttls }
    }

    /// Configured TTLs
    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// Read through the cache: return a hit as-is, otherwise invoke the
    /// loader and store its result under `key` with `ttl`.
    pub async fn get_through<T, F, Fut>(&self, key: &str, ttl: Duration, load: F) -> DocumentResult<T>
    where
        T: Serialize + DeserializeOwned + Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = DocumentResult<T>>,
    {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    Logger::debug("CACHE_HIT", &[("key", key.to_string())]);
                    return Ok(value);
                }
                Err(e) => {
                    // Unusable entry: treat as a miss and let the fresh
                    // value overwrite it below.
                    Logger::warn(
                        "CACHE_ENTRY_CORRUPT",
                        &[("key", key.to_string()), ("error", e.to_string())],
                    );
                }
            },
            Ok(None) => {
                Logger::debug("CACHE_MISS", &[("key", key.to_string())]);
            }
            Err(e) => {
                Logger::warn(
                    "CACHE_UNAVAILABLE",
                    &[("key", key.to_string()), ("error", e.to_string())],
                );
            }
        }

        let value = load().await?;

        if value.should_cache() {
            match serde_json::to_string(&value) {
                Ok(raw) => {
                    if let Err(e) = self.store.set(key, raw, ttl).await {
                        Logger::warn(
                            "CACHE_WRITE_FAILED",
                            &[("key", key.to_string()), ("error", e.to_string())],
                        );
                    }
                }
                Err(e) => {
                    Logger::warn(
                        "CACHE_ENCODE_FAILED",
                        &[("key", key.to_string()), ("error", e.to_string())],
                    );
                }
            }
        }

        Ok(value)
    }

    /// Drop one exact key, swallowing store errors
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            Logger::warn(
                "CACHE_DELETE_FAILED",
                &[("key", key.to_string()), ("error", e.to_string())],
            );
        }
    }

    /// Drop every key of the given operations, swallowing store errors
    pub async fn purge(&self, operations: &[&str]) {
        for operation in operations {
            match self.store.purge_prefix(&keys::prefix(operation)).await {
                Ok(purged) => {
                    Logger::debug(
                        "CACHE_PURGED",
                        &[
                            ("operation", operation.to_string()),
                            ("keys", purged.to_string()),
                        ],
                    );
                }
                Err(e) => {
                    Logger::warn(
                        "CACHE_PURGE_FAILED",
                        &[
                            ("operation", operation.to_string()),
                            ("error", e.to_string()),
                        ],
                    );
                }
            }
        }
    }
}
