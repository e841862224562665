//! Strata library crate: a two-tier read-through cache coordinator.
//!
//! A [`TieredCache`] composes two [`TierStore`] collaborators — a fast
//! local tier1 and a slow, shared tier2 — and a [`NotificationSource`]
//! delivering key-change events:
//!
//! - Reads consult tier1, fall back to tier2, and repopulate tier1.
//!   Concurrent readers of the same absent key share one tier2 round trip
//!   (cache-stampede protection).
//! - Writes and deletes hit tier2 before tier1, so tier1 can be stale but
//!   never ahead of tier2.
//! - Key-change notifications (e.g. Redis keyspace events) purge tier1
//!   entries mutated by other processes. Consistency between tiers is
//!   eventual: a staleness window exists between a foreign tier2 mutation
//!   and delivery of its invalidation event.
//!
//! The coordinator owns none of the backing stores: eviction, TTL
//! enforcement, and wire protocols belong to the collaborators.
//! [`MemoryStore`] is a bundled moka-backed reference tier.
//!
//! Observable [`CacheEvent`]s (`set`, `invalidated`, `reset`, `error`) are
//! published on a broadcast channel via
//! [`TieredCache::subscribe_events`].
//!
//! Mock collaborators are available behind `#[cfg(any(test, feature =
//! "mock"))]`.

pub mod cache;
pub mod config;
pub mod events;
pub mod notify;
pub mod store;

pub use cache::{CacheError, CacheResult, TieredCache, TieredCacheHandle};
pub use config::{ConfigError, InvalidationConfig};
pub use events::CacheEvent;
#[cfg(any(test, feature = "mock"))]
pub use notify::MockNotificationSource;
pub use notify::{KeyEvent, KeyEventKind, KeyEventStream, NotificationSource, NotifyError};
#[cfg(any(test, feature = "mock"))]
pub use store::MockTierStore;
pub use store::{MemoryStore, TierError, TierResult, TierStore};
