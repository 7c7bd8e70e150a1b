//! vellum - a versioned document store with coherent caching and lifecycle events
//!
//! The engine in three interlocking parts:
//! - transactional, gap-free version allocation in the repository
//! - a fail-open read-through cache purged on every mutation
//! - at-least-once event fan-out to per-topic processors
//!
//! A mutation is complete once the persisted state, the cache, and the
//! event stream agree on the new lifecycle state.

pub mod cache;
pub mod cli;
pub mod document;
pub mod events;
pub mod http_server;
pub mod observability;
pub mod processing;
pub mod repository;
pub mod service;
