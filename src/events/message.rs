//! # Lifecycle Topics & Message Envelope
//!
//! One topic per mutation kind. The message key is the entity id (used for
//! partition affinity by the broker); the value is the JSON serialization
//! of the full entity state at the time of the mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle event topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "document.created")]
    DocumentCreated,
    #[serde(rename = "document.archived")]
    DocumentArchived,
    #[serde(rename = "document.unarchived")]
    DocumentUnarchived,
    #[serde(rename = "document.deleted")]
    DocumentDeleted,
    #[serde(rename = "version.added")]
    VersionAdded,
}

impl Topic {
    /// All lifecycle topics, in declaration order
    pub const ALL: [Topic; 5] = [
        Topic::DocumentCreated,
        Topic::DocumentArchived,
        Topic::DocumentUnarchived,
        Topic::DocumentDeleted,
        Topic::VersionAdded,
    ];

    /// Returns the wire name of this topic
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::DocumentCreated => "document.created",
            Topic::DocumentArchived => "document.archived",
            Topic::DocumentUnarchived => "document.unarchived",
            Topic::DocumentDeleted => "document.deleted",
            Topic::VersionAdded => "version.added",
        }
    }

    /// Parse a wire topic name
    pub fn parse(s: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A keyed message on a lifecycle topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    /// Destination topic
    pub topic: Topic,

    /// Partition/ordering key: the entity's id
    pub key: String,

    /// Full entity state, JSON-serialized
    pub payload: Value,

    /// When the publisher built the message
    pub published_at: DateTime<Utc>,
}

impl EventMessage {
    /// Build a message for the given topic, keyed by entity id
    pub fn new(topic: Topic, key: impl Into<String>, payload: Value) -> Self {
        Self {
            topic,
            key: key.into(),
            payload,
            published_at: Utc::now(),
        }
    }
}
