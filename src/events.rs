//! Observable coordinator events.
//!
//! The coordinator publishes onto a broadcast channel instead of invoking
//! registered callbacks, so any number of observers can subscribe without
//! coupling the coordinator to a consumer. Delivery is fire-and-forget:
//! slow subscribers lag-drop rather than backpressure cache operations.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::store::TierError;

/// Events observable via [`crate::TieredCache::subscribe_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent<V> {
    /// A value was written through the coordinator.
    Set {
        /// Written key.
        key: String,
        /// Written value.
        value: V,
        /// TTL hint passed to the tiers.
        ttl: Option<Duration>,
    },
    /// A tier1 entry was purged, either by `del` (no channel) or by a
    /// delivered invalidation event (with its source channel).
    Invalidated {
        /// Purged key.
        key: String,
        /// Source channel for externally-triggered invalidations.
        channel: Option<String>,
    },
    /// Both tiers were cleared.
    Reset,
    /// A tier operation failed on a path that does not surface the failure
    /// to any caller (background invalidation, best-effort tier1 writes).
    Error(TierError),
}

/// Broadcast publisher shared by the coordinator and its background task.
pub(crate) struct EventBus<V> {
    tx: broadcast::Sender<CacheEvent<V>>,
}

impl<V> Clone for EventBus<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<V> EventBus<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent<V>> {
        self.tx.subscribe()
    }

    /// Publishes an event; having no subscribers is not an error.
    pub fn publish(&self, event: CacheEvent<V>) {
        let _ = self.tx.send(event);
    }
}

impl<V> std::fmt::Debug for EventBus<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receivers", &self.tx.receiver_count())
            .finish()
    }
}
