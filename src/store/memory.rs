//! In-memory tier store (moka-backed).
//!
//! Reference tier1 implementation: bounded LRU with per-entry TTL
//! pass-through. Also usable as a stand-in tier2 in tests.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::sync::Cache;

use super::error::TierResult;
use super::TierStore;

#[derive(Clone)]
struct Entry<V> {
    value: V,
    ttl: Option<Duration>,
}

/// Expiry policy that honors each entry's own TTL hint.
struct TtlExpiry;

impl<V> Expiry<String, Entry<V>> for TtlExpiry
where
    V: Clone + Send + Sync + 'static,
{
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // A rewrite replaces the previous TTL rather than inheriting it.
        entry.ttl
    }
}

/// Bounded in-memory store keyed by string.
pub struct MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    entries: Cache<String, Entry<V>>,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    const DEFAULT_CAPACITY: u64 = 10_000;

    /// Creates a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a store with a max entry capacity (LRU eviction).
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(TtlExpiry)
                .build(),
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl<V> TierStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> TierResult<Option<V>> {
        Ok(self.entries.get(key).map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> TierResult<()> {
        self.entries.insert(key.to_string(), Entry { value, ttl });
        Ok(())
    }

    async fn del(&self, key: &str) -> TierResult<()> {
        self.entries.invalidate(key);
        Ok(())
    }

    async fn has(&self, key: &str) -> TierResult<bool> {
        Ok(self.entries.get(key).is_some())
    }

    async fn reset(&self) -> TierResult<()> {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        Ok(())
    }
}
