//! # Processing Collaborators
//!
//! One processor per lifecycle topic, each exposing a single `process`
//! operation over the deserialized entity. Failures are caught by the
//! dispatcher, not here; processors just return errors.

use serde_json::Value;
use thiserror::Error;

use async_trait::async_trait;

pub mod spool;

pub use spool::{DocumentSink, VersionSink};

/// Result type for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Payload did not deserialize into the expected entity shape
    #[error("Malformed entity payload: {0}")]
    Malformed(String),

    /// Output could not be written
    #[error("Spool write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessingError {
    /// Create a malformed-payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// A downstream consumer of one lifecycle topic
#[async_trait]
pub trait Processor: Send + Sync {
    /// Processor name for logs
    fn name(&self) -> &'static str;

    /// Consume one entity. No return value beyond success/failure.
    async fn process(&self, entity: Value) -> ProcessingResult<()>;
}
