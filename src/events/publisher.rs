//! # Event Publisher
//!
//! Turns a committed mutation's resulting entity into exactly one keyed
//! message on the topic for that mutation kind. Publish runs after the
//! store mutation and independently of the cache purge outcome. There is
//! no retry here: a failed publish is surfaced to the caller, who reports
//! it to operators without failing the mutation (the store already
//! committed).

use std::sync::Arc;

use crate::document::{Document, DocumentVersion};
use crate::observability::Logger;

use super::broker::MessageBroker;
use super::errors::EventResult;
use super::message::{EventMessage, Topic};

/// Publishes lifecycle events for committed mutations
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<dyn MessageBroker>,
}

impl EventPublisher {
    /// Create a publisher on the given broker
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self { broker }
    }

    /// Emit `document.created` for a newly created document
    pub async fn document_created(&self, document: &Document) -> EventResult<()> {
        self.emit_document(Topic::DocumentCreated, document).await
    }

    /// Emit `document.archived` for an archived document
    pub async fn document_archived(&self, document: &Document) -> EventResult<()> {
        self.emit_document(Topic::DocumentArchived, document).await
    }

    /// Emit `document.unarchived` for a reactivated document
    pub async fn document_unarchived(&self, document: &Document) -> EventResult<()> {
        self.emit_document(Topic::DocumentUnarchived, document).await
    }

    /// Emit `document.deleted` for a soft-deleted document
    pub async fn document_deleted(&self, document: &Document) -> EventResult<()> {
        self.emit_document(Topic::DocumentDeleted, document).await
    }

    /// Emit `version.added` for a newly allocated version
    pub async fn version_added(&self, version: &DocumentVersion) -> EventResult<()> {
        let payload = serde_json::to_value(version)?;
        self.emit(Topic::VersionAdded, version.id.to_string(), payload)
            .await
    }

    async fn emit_document(&self, topic: Topic, document: &Document) -> EventResult<()> {
        let payload = serde_json::to_value(document)?;
        self.emit(topic, document.id.to_string(), payload).await
    }

    async fn emit(
        &self,
        topic: Topic,
        key: String,
        payload: serde_json::Value,
    ) -> EventResult<()> {
        self.broker
            .publish(EventMessage::new(topic, key.clone(), payload))
            .await?;

        Logger::info(
            "EVENT_PUBLISHED",
            &[("topic", topic.to_string()), ("key", key)],
        );
        Ok(())
    }
}
