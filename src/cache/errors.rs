//! # Cache Errors
//!
//! Errors from the cache store. These never reach service callers: every
//! cache failure is caught at the call site and the read falls through to
//! the source of truth.

use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache store errors
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Store unreachable or refused the operation
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Stored value could not be used
    #[error("Cache entry corrupt: {0}")]
    Corrupt(String),
}

impl CacheError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
