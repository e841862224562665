//! Tiered cache coordinator: tier1 read-through tier2 with async
//! invalidation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{FutureExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::error::{CacheError, CacheResult};
use super::inflight::{InflightRegistry, Join};
use crate::config::InvalidationConfig;
use crate::events::{CacheEvent, EventBus};
use crate::notify::{KeyEventStream, NotificationSource};
use crate::store::TierStore;

/// Read-through coordinator over a fast tier1 and a slow, shared tier2.
///
/// Reads consult tier1 first and fall back to tier2, deduplicating
/// concurrent tier2 fetches of the same key. Writes and deletes go to tier2
/// before tier1, so a crash between the two leaves tier1 at worst stale,
/// never ahead of tier2. A background task consumes key-change notifications
/// and purges tier1 entries mutated by other processes.
///
/// The tiers are shared collaborators: the coordinator must not assume it is
/// the only writer to either of them.
pub struct TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    tier1: Arc<dyn TierStore<V>>,
    tier2: Arc<dyn TierStore<V>>,
    inflight: InflightRegistry<V>,
    events: EventBus<V>,
    subscription: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl<V> TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Builds the coordinator: validates `config`, subscribes to the
    /// notification source, and spawns the invalidation task.
    ///
    /// Fails fast on invalid configuration or if the subscription cannot be
    /// established.
    pub async fn connect(
        tier1: Arc<dyn TierStore<V>>,
        tier2: Arc<dyn TierStore<V>>,
        source: Arc<dyn NotificationSource>,
        config: InvalidationConfig,
    ) -> CacheResult<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_capacity);
        let pattern = config.channel_pattern();
        let stream = source.subscribe(&pattern).await?;
        info!(pattern = %pattern, "invalidation subscription established");

        let handle = tokio::spawn(Self::run_invalidations(
            stream,
            Arc::clone(&tier1),
            events.clone(),
        ));

        Ok(Self {
            tier1,
            tier2,
            inflight: InflightRegistry::new(),
            events,
            subscription: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
        })
    }

    /// Background reaction to key-change notifications: purge tier1, which
    /// is all that is needed — tier2 already reflects the change that
    /// triggered the event. One failed purge never stops the loop.
    async fn run_invalidations(
        mut stream: KeyEventStream,
        tier1: Arc<dyn TierStore<V>>,
        events: EventBus<V>,
    ) {
        while let Some(event) = stream.next().await {
            match tier1.del(&event.key).await {
                Ok(()) => {
                    debug!(key = %event.key, channel = %event.channel, "tier1 entry invalidated");
                    events.publish(CacheEvent::Invalidated {
                        key: event.key,
                        channel: Some(event.channel),
                    });
                }
                Err(err) => {
                    warn!(key = %event.key, error = %err, "failed to invalidate tier1 entry");
                    events.publish(CacheEvent::Error(err));
                }
            }
        }
        debug!("invalidation stream ended");
    }

    /// Gets a key from tier1, falling back to tier2.
    ///
    /// Concurrent callers for the same absent key share one tier2 round
    /// trip. A tier2 hit populates tier1 best-effort. A true miss is
    /// `Ok(None)`; a tier2 failure is returned as an error (and mirrored
    /// onto the event bus) rather than conflated with a miss.
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> CacheResult<Option<V>> {
        match self.tier1.get(key).await {
            Ok(Some(value)) => {
                debug!("tier1 hit");
                return Ok(Some(value));
            }
            Ok(None) => debug!("tier1 miss"),
            Err(err) => {
                // Tier1 is best-effort on the read path; tier2 stays
                // authoritative even when the local tier is wedged.
                warn!(error = %err, "tier1 read failed, falling through to tier2");
                self.events.publish(CacheEvent::Error(err));
            }
        }

        let join = self.inflight.join_or_register(key, || {
            let tier2 = Arc::clone(&self.tier2);
            let key = key.to_string();
            async move { tier2.get(&key).await }.boxed()
        });

        let outcome = match join {
            Join::Follower(fetch) => {
                debug!("joining inflight tier2 fetch");
                fetch.await
            }
            Join::Leader { fetch, guard } => {
                let outcome = fetch.await;
                let still_current = guard.complete();
                if still_current {
                    if let Ok(Some(value)) = &outcome {
                        if let Err(err) = self.tier1.set(key, value.clone(), None).await {
                            warn!(error = %err, "failed to populate tier1 after tier2 hit");
                            self.events.publish(CacheEvent::Error(err));
                        }
                    }
                } else {
                    // A set/del landed while the fetch ran; its result is
                    // stale and must not repopulate tier1.
                    debug!("tier2 fetch superseded by a write, skipping tier1 populate");
                }
                outcome
            }
        };

        match outcome {
            Ok(value) => {
                debug!(hit = value.is_some(), "tier2 fetch complete");
                Ok(value)
            }
            Err(err) => {
                self.events.publish(CacheEvent::Error(err.clone()));
                Err(CacheError::Tier2(err))
            }
        }
    }

    /// Sets a key in both tiers, tier2 first.
    ///
    /// A tier2 failure fails the operation with tier1 untouched. Tier2
    /// success is the durability contract: a subsequent tier1 failure is
    /// surfaced on the event bus but does not fail the `set` (tier1
    /// self-heals on the next miss).
    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> CacheResult<()> {
        self.tier2
            .set(key, value.clone(), ttl)
            .await
            .map_err(CacheError::Tier2)?;

        if let Err(err) = self.tier1.set(key, value.clone(), ttl).await {
            warn!(error = %err, "tier1 write failed after tier2 commit");
            self.events.publish(CacheEvent::Error(err));
        }

        self.inflight.invalidate(key);
        self.events.publish(CacheEvent::Set {
            key: key.to_string(),
            value,
            ttl,
        });
        debug!("set complete");
        Ok(())
    }

    /// Checks if a key exists in either tier. Does not populate tier1.
    #[instrument(skip(self))]
    pub async fn has(&self, key: &str) -> CacheResult<bool> {
        if self.tier1.has(key).await.map_err(CacheError::Tier1)? {
            return Ok(true);
        }
        self.tier2.has(key).await.map_err(CacheError::Tier2)
    }

    /// Deletes a key from both tiers, tier2 first.
    ///
    /// Unlike `set`, a tier1 failure here is propagated: a tier1 entry
    /// surviving a delete keeps serving stale data with no bounded
    /// self-heal window.
    #[instrument(skip(self))]
    pub async fn del(&self, key: &str) -> CacheResult<()> {
        self.tier2.del(key).await.map_err(CacheError::Tier2)?;
        self.tier1.del(key).await.map_err(CacheError::Tier1)?;

        self.inflight.invalidate(key);
        self.events.publish(CacheEvent::Invalidated {
            key: key.to_string(),
            channel: None,
        });
        debug!("del complete");
        Ok(())
    }

    /// Clears both tiers entirely and drops every inflight fetch.
    /// Administrative/test use; not scoped to a single key.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> CacheResult<()> {
        self.tier2.reset().await.map_err(CacheError::Tier2)?;
        self.tier1.reset().await.map_err(CacheError::Tier1)?;

        self.inflight.clear();
        self.events.publish(CacheEvent::Reset);
        info!("caches reset");
        Ok(())
    }

    /// Releases the invalidation subscription. Idempotent.
    ///
    /// Cache operations keep working after close (the tiers are
    /// caller-owned); only invalidation delivery stops.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let handle = self.subscription.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            // Cancellation is expected here.
            let _ = handle.await;
        }
        info!("invalidation subscription released");
    }

    /// Returns `true` once [`TieredCache::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Subscribes to observable coordinator events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<CacheEvent<V>> {
        self.events.subscribe()
    }

    /// Number of tier2 fetches currently inflight.
    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }
}

impl<V> Drop for TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(handle) = self.subscription.lock().take() {
            handle.abort();
        }
    }
}

impl<V> std::fmt::Debug for TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("inflight", &self.inflight.len())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Cloneable shared handle to a [`TieredCache`].
pub struct TieredCacheHandle<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<TieredCache<V>>,
}

impl<V> Clone for TieredCacheHandle<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> TieredCacheHandle<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(cache: TieredCache<V>) -> Self {
        Self {
            inner: Arc::new(cache),
        }
    }

    pub async fn get(&self, key: &str) -> CacheResult<Option<V>> {
        self.inner.get(key).await
    }

    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> CacheResult<()> {
        self.inner.set(key, value, ttl).await
    }

    pub async fn has(&self, key: &str) -> CacheResult<bool> {
        self.inner.has(key).await
    }

    pub async fn del(&self, key: &str) -> CacheResult<()> {
        self.inner.del(key).await
    }

    pub async fn reset(&self) -> CacheResult<()> {
        self.inner.reset().await
    }

    pub async fn close(&self) {
        self.inner.close().await
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CacheEvent<V>> {
        self.inner.subscribe_events()
    }

    pub fn inflight_len(&self) -> usize {
        self.inner.inflight_len()
    }

    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<V> std::fmt::Debug for TieredCacheHandle<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCacheHandle")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}
