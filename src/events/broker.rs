//! # Message Broker
//!
//! Broker contract plus an in-process implementation on tokio channels.
//!
//! Ordering is per-sender FIFO within one topic, the in-process analogue of
//! partition-level ordering for a given entity key. Delivery toward
//! consumers is at-least-once from the consumer's point of view; consumers
//! must tolerate duplicates. The consumption position advances regardless
//! of handler outcome, so a failed handler does not see the message again.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;

use async_trait::async_trait;

use super::errors::{EventError, EventResult};
use super::message::{EventMessage, Topic};

/// Receiver side of one subscription (a logical consumption group)
pub type MessageReceiver = mpsc::UnboundedReceiver<EventMessage>;

/// Message broker contract
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Append one keyed message to a topic
    async fn publish(&self, message: EventMessage) -> EventResult<()>;

    /// Subscribe one consumption group to a set of topics.
    ///
    /// Messages on every subscribed topic arrive on the single returned
    /// receiver, interleaved across topics.
    fn subscribe(&self, topics: &[Topic]) -> MessageReceiver;
}

/// In-process broker backed by per-topic channel fan-out
#[derive(Debug, Default)]
pub struct ChannelBroker {
    subscribers: RwLock<HashMap<Topic, Vec<mpsc::UnboundedSender<EventMessage>>>>,
}

impl ChannelBroker {
    /// Create a broker with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions on a topic (test helper)
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .read()
            .map(|s| s.get(&topic).map_or(0, |v| v.len()))
            .unwrap_or(0)
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn publish(&self, message: EventMessage) -> EventResult<()> {
        let topic = message.topic;
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| EventError::publish(topic.as_str(), "subscriber table poisoned"))?;

        // Closed receivers are pruned on the way through; a topic with no
        // live consumers still accepts the append.
        if let Some(senders) = subscribers.get_mut(&topic) {
            senders.retain(|sender| sender.send(message.clone()).is_ok());
        }

        Ok(())
    }

    fn subscribe(&self, topics: &[Topic]) -> MessageReceiver {
        let (tx, rx) = mpsc::unbounded_channel();

        if let Ok(mut subscribers) = self.subscribers.write() {
            for topic in topics {
                subscribers.entry(*topic).or_default().push(tx.clone());
            }
        }

        rx
    }
}
