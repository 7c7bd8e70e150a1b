//! # Lifecycle Events
//!
//! Event fan-out for committed mutations:
//!
//! - **Publisher** (after-commit): one keyed message per mutation, full
//!   entity state as the JSON payload
//! - **Broker**: publish/subscribe contract with an in-process channel
//!   implementation
//! - **Dispatcher**: single consumption group over all topics, routing
//!   through a registered topic→processor map
//!
//! Delivery is at-least-once with per-key ordering only; cross-entity
//! ordering is not guaranteed. Handler failures are logged and never
//! redelivered (no retry or dead-letter path).

pub mod broker;
pub mod dispatcher;
pub mod errors;
pub mod message;
pub mod publisher;

pub use broker::{ChannelBroker, MessageBroker, MessageReceiver};
pub use dispatcher::{DispatchOutcome, DispatchStats, EventDispatcher};
pub use errors::{EventError, EventResult};
pub use message::{EventMessage, Topic};
pub use publisher::EventPublisher;
