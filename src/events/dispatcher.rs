//! # Event Dispatcher
//!
//! Consumes all lifecycle topics under one logical consumption group and
//! routes each message through a registered topic→processor map. One
//! message's failure never stops consumption of the next, and a failed
//! message is not redelivered: the consumption position advances after the
//! handler returns, success or not.
//!
//! A per-message timeout bounds how long one stuck processor can hold the
//! dispatch loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::observability::Logger;
use crate::processing::Processor;

use super::broker::{MessageBroker, MessageReceiver};
use super::message::{EventMessage, Topic};

/// Outcome of dispatching one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Processor completed
    Processed,
    /// Processor returned an error (logged, not redelivered)
    Failed,
    /// Processor exceeded the per-message timeout
    TimedOut,
    /// No processor registered for the topic
    Unroutable,
}

/// Counters accumulated over a dispatch loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub processed: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub unroutable: u64,
}

impl DispatchStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Processed => self.processed += 1,
            DispatchOutcome::Failed => self.failed += 1,
            DispatchOutcome::TimedOut => self.timed_out += 1,
            DispatchOutcome::Unroutable => self.unroutable += 1,
        }
    }
}

/// Routes lifecycle messages to their registered processors
#[derive(Default)]
pub struct EventDispatcher {
    processors: HashMap<Topic, Arc<dyn Processor>>,
    message_timeout: Option<Duration>,
}

impl EventDispatcher {
    /// Create a dispatcher with no registrations
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the time one processor may spend on one message
    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = Some(timeout);
        self
    }

    /// Register the processor for a topic.
    ///
    /// One processor per topic; a second registration replaces the first.
    pub fn register(&mut self, topic: Topic, processor: Arc<dyn Processor>) {
        self.processors.insert(topic, processor);
    }

    /// Topics with a registered processor
    pub fn topics(&self) -> Vec<Topic> {
        // Stable order for subscribe calls and logs.
        Topic::ALL
            .into_iter()
            .filter(|t| self.processors.contains_key(t))
            .collect()
    }

    /// Dispatch one message to its processor
    pub async fn handle(&self, message: &EventMessage) -> DispatchOutcome {
        let Some(processor) = self.processors.get(&message.topic) else {
            Logger::warn(
                "EVENT_UNROUTABLE",
                &[
                    ("topic", message.topic.to_string()),
                    ("key", message.key.clone()),
                ],
            );
            return DispatchOutcome::Unroutable;
        };

        let work = processor.process(message.payload.clone());
        let result = match self.message_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, work).await {
                Ok(result) => result,
                Err(_) => {
                    Logger::error(
                        "EVENT_PROCESSING_TIMEOUT",
                        &[
                            ("topic", message.topic.to_string()),
                            ("key", message.key.clone()),
                            ("processor", processor.name().to_string()),
                            ("timeout_ms", timeout.as_millis().to_string()),
                        ],
                    );
                    return DispatchOutcome::TimedOut;
                }
            },
            None => work.await,
        };

        match result {
            Ok(()) => {
                Logger::debug(
                    "EVENT_PROCESSED",
                    &[
                        ("topic", message.topic.to_string()),
                        ("key", message.key.clone()),
                        ("processor", processor.name().to_string()),
                    ],
                );
                DispatchOutcome::Processed
            }
            Err(e) => {
                // Logged and dropped; the broker position has already
                // advanced, so there is no redelivery.
                Logger::error(
                    "EVENT_PROCESSING_FAILED",
                    &[
                        ("topic", message.topic.to_string()),
                        ("key", message.key.clone()),
                        ("processor", processor.name().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                DispatchOutcome::Failed
            }
        }
    }

    /// Drain a receiver until its senders are gone
    pub async fn run(&self, mut receiver: MessageReceiver) -> DispatchStats {
        let mut stats = DispatchStats::default();
        while let Some(message) = receiver.recv().await {
            stats.record(self.handle(&message).await);
        }
        stats
    }

    /// Subscribe to all registered topics and consume in a background task
    pub fn spawn(self, broker: &dyn MessageBroker) -> JoinHandle<DispatchStats> {
        let receiver = broker.subscribe(&self.topics());
        Logger::info(
            "DISPATCHER_STARTED",
            &[("topics", self.topics().len().to_string())],
        );
        tokio::spawn(async move { self.run(receiver).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::broker::ChannelBroker;
    use crate::processing::{ProcessingError, ProcessingResult};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Recording {
        calls: AtomicU64,
    }

    #[async_trait]
    impl Processor for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn process(&self, _entity: Value) -> ProcessingResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Processor for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        async fn process(&self, _entity: Value) -> ProcessingResult<()> {
            Err(ProcessingError::malformed("expected failure"))
        }
    }

    struct Stalls;

    #[async_trait]
    impl Processor for Stalls {
        fn name(&self) -> &'static str {
            "stalls"
        }

        async fn process(&self, _entity: Value) -> ProcessingResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_routes_by_topic() {
        let recording = Arc::new(Recording {
            calls: AtomicU64::new(0),
        });
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Topic::DocumentCreated, recording.clone());

        let message = EventMessage::new(Topic::DocumentCreated, "d1", json!({}));
        assert_eq!(
            dispatcher.handle(&message).await,
            DispatchOutcome::Processed
        );
        assert_eq!(recording.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unregistered_topic_is_unroutable() {
        let dispatcher = EventDispatcher::new();
        let message = EventMessage::new(Topic::DocumentDeleted, "d1", json!({}));
        assert_eq!(
            dispatcher.handle(&message).await,
            DispatchOutcome::Unroutable
        );
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_message() {
        let recording = Arc::new(Recording {
            calls: AtomicU64::new(0),
        });
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Topic::DocumentCreated, Arc::new(AlwaysFails));
        dispatcher.register(Topic::VersionAdded, recording.clone());

        let broker = ChannelBroker::new();
        let rx = broker.subscribe(&dispatcher.topics());

        broker
            .publish(EventMessage::new(Topic::DocumentCreated, "d1", json!({})))
            .await
            .unwrap();
        broker
            .publish(EventMessage::new(Topic::VersionAdded, "v1", json!({})))
            .await
            .unwrap();
        drop(broker);

        let stats = dispatcher.run(rx).await;
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(recording.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_timeout_releases_the_loop() {
        let mut dispatcher =
            EventDispatcher::new().with_message_timeout(Duration::from_millis(50));
        dispatcher.register(Topic::DocumentCreated, Arc::new(Stalls));

        let message = EventMessage::new(Topic::DocumentCreated, "d1", json!({}));
        assert_eq!(dispatcher.handle(&message).await, DispatchOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_spawn_consumes_published_messages() {
        let recording = Arc::new(Recording {
            calls: AtomicU64::new(0),
        });
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Topic::DocumentArchived, recording.clone());

        let broker = ChannelBroker::new();
        let handle = dispatcher.spawn(&broker);

        broker
            .publish(EventMessage::new(Topic::DocumentArchived, "d1", json!({})))
            .await
            .unwrap();
        drop(broker);

        let stats = handle.await.unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(recording.calls.load(Ordering::SeqCst), 1);
    }
}
