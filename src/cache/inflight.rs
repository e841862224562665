//! Inflight tier2 fetch registry (cache-stampede protection).
//!
//! At most one tier2 fetch per key exists at any time. The first caller to
//! register becomes the leader and drives the fetch; later callers for the
//! same key join as followers and await the shared future. Check-then-
//! register happens under one mutex, so the race window between "no entry"
//! and "entry registered" is closed even under real parallelism.
//!
//! Each registration carries a token. Writes and deletes drop the current
//! registration; a leader whose token is no longer current learns its fetch
//! result was superseded and must not use it to populate tier1.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;

use crate::store::TierResult;

/// A tier2 fetch shared by every caller waiting on the same key.
pub(crate) type SharedFetch<V> = Shared<BoxFuture<'static, TierResult<Option<V>>>>;

struct Registration<V> {
    fetch: SharedFetch<V>,
    token: u64,
}

/// Outcome of [`InflightRegistry::join_or_register`].
pub(crate) enum Join<'a, V>
where
    V: Clone + Send + Sync + 'static,
{
    /// This caller started the fetch; the guard owns cleanup.
    Leader {
        fetch: SharedFetch<V>,
        guard: InflightGuard<'a, V>,
    },
    /// Another caller already started the fetch.
    Follower(SharedFetch<V>),
}

/// Key → shared in-progress tier2 fetch, owned by the coordinator.
pub(crate) struct InflightRegistry<V> {
    entries: Mutex<HashMap<String, Registration<V>>>,
    next_token: AtomicU64,
}

impl<V> InflightRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        }
    }

    /// Joins an existing fetch for `key`, or registers the one produced by
    /// `make` and returns leadership. Atomic with respect to other callers.
    pub fn join_or_register<'a, F>(&'a self, key: &str, make: F) -> Join<'a, V>
    where
        F: FnOnce() -> BoxFuture<'static, TierResult<Option<V>>>,
    {
        let mut entries = self.entries.lock();
        if let Some(registration) = entries.get(key) {
            return Join::Follower(registration.fetch.clone());
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let fetch = make().shared();
        entries.insert(
            key.to_string(),
            Registration {
                fetch: fetch.clone(),
                token,
            },
        );

        Join::Leader {
            fetch,
            guard: InflightGuard {
                registry: self,
                key: key.to_string(),
                token,
                completed: false,
            },
        }
    }

    /// Removes the registration for `key` if it still belongs to `token`.
    /// Returns `false` when a write or delete already superseded it.
    fn finish(&self, key: &str, token: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(registration) if registration.token == token => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Drops any registration for `key`. Called by `set`/`del`: a fetch
    /// result resolved after a newer write must not win.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Drops every registration (used by `reset`).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes the leader's registration when the fetch completes, and also when
/// the leader is cancelled mid-await (cleanup is unconditional).
pub(crate) struct InflightGuard<'a, V>
where
    V: Clone + Send + Sync + 'static,
{
    registry: &'a InflightRegistry<V>,
    key: String,
    token: u64,
    completed: bool,
}

impl<V> InflightGuard<'_, V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Removes the registration and reports whether it was still current
    /// (i.e. no `set`/`del` superseded the fetch while it ran).
    pub fn complete(mut self) -> bool {
        self.completed = true;
        self.registry.finish(&self.key, self.token)
    }
}

impl<V> Drop for InflightGuard<'_, V>
where
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.completed {
            self.registry.finish(&self.key, self.token);
        }
    }
}
