//! # Event Errors
//!
//! Errors from publishing and dispatching lifecycle events. Publish
//! failures are reported to operators through the logger; they never
//! change the client-visible result of the mutation that triggered them.

use thiserror::Error;

/// Result type for event operations
pub type EventResult<T> = Result<T, EventError>;

/// Event pipeline errors
#[derive(Debug, Clone, Error)]
pub enum EventError {
    /// Broker rejected or lost the message
    #[error("Publish failed on topic {topic}: {reason}")]
    Publish { topic: String, reason: String },

    /// Entity state could not be serialized into a payload
    #[error("Payload serialization failed: {0}")]
    Serialize(String),
}

impl EventError {
    /// Create a publish error
    pub fn publish(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Publish {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EventError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}
