//! Mock tier store for tests: call counters, failure injection, latency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::error::{TierError, TierResult};
use super::TierStore;

#[derive(Default, Clone)]
pub struct MockTierStore<V> {
    entries: Arc<RwLock<HashMap<String, V>>>,
    get_calls: Arc<AtomicUsize>,
    set_calls: Arc<AtomicUsize>,
    del_calls: Arc<AtomicUsize>,
    has_calls: Arc<AtomicUsize>,
    reset_calls: Arc<AtomicUsize>,
    fail_gets: Arc<AtomicBool>,
    fail_sets: Arc<AtomicBool>,
    fail_dels: Arc<AtomicBool>,
    get_latency: Arc<Mutex<Option<Duration>>>,
}

impl<V> MockTierStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            get_calls: Arc::new(AtomicUsize::new(0)),
            set_calls: Arc::new(AtomicUsize::new(0)),
            del_calls: Arc::new(AtomicUsize::new(0)),
            has_calls: Arc::new(AtomicUsize::new(0)),
            reset_calls: Arc::new(AtomicUsize::new(0)),
            fail_gets: Arc::new(AtomicBool::new(false)),
            fail_sets: Arc::new(AtomicBool::new(false)),
            fail_dels: Arc::new(AtomicBool::new(false)),
            get_latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Seeds an entry directly, bypassing counters — emulates state written
    /// by another process.
    pub fn insert_direct(&self, key: &str, value: V) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), value);
    }

    /// Removes an entry directly — emulates an external delete.
    pub fn remove_direct(&self, key: &str) {
        self.entries.write().expect("lock poisoned").remove(key);
    }

    /// Reads an entry directly, bypassing counters and failure injection.
    pub fn get_direct(&self, key: &str) -> Option<V> {
        self.entries.read().expect("lock poisoned").get(key).cloned()
    }

    /// Drops all entries directly — emulates an external flush.
    pub fn clear_direct(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().expect("lock poisoned").contains_key(key)
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn del_count(&self) -> usize {
        self.del_calls.load(Ordering::SeqCst)
    }

    pub fn has_count(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }

    pub fn reset_count(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent `get` fail until switched off.
    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `set` fail until switched off.
    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `del` fail until switched off.
    pub fn fail_dels(&self, fail: bool) {
        self.fail_dels.store(fail, Ordering::SeqCst);
    }

    /// Adds artificial latency to `get`, to hold fetches inflight.
    pub fn set_get_latency(&self, latency: Option<Duration>) {
        *self.get_latency.lock().expect("lock poisoned") = latency;
    }

    fn injected(&self, op: &str) -> TierError {
        TierError::Backend {
            reason: format!("injected {op} failure"),
        }
    }
}

impl<V> std::fmt::Debug for MockTierStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTierStore")
            .field("get_calls", &self.get_calls.load(Ordering::SeqCst))
            .field("set_calls", &self.set_calls.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<V> TierStore<V> for MockTierStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> TierResult<Option<V>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.get_latency.lock().expect("lock poisoned");
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(self.injected("get"));
        }
        Ok(self.get_direct(key))
    }

    async fn set(&self, key: &str, value: V, _ttl: Option<Duration>) -> TierResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(self.injected("set"));
        }
        self.insert_direct(key, value);
        Ok(())
    }

    async fn del(&self, key: &str) -> TierResult<()> {
        self.del_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_dels.load(Ordering::SeqCst) {
            return Err(self.injected("del"));
        }
        self.remove_direct(key);
        Ok(())
    }

    async fn has(&self, key: &str) -> TierResult<bool> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.contains(key))
    }

    async fn reset(&self) -> TierResult<()> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        self.clear_direct();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls_and_injects_failures() {
        let store: MockTierStore<String> = MockTierStore::new();

        store.set("k", "v".to_string(), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.set_count(), 1);
        assert_eq!(store.get_count(), 1);

        store.fail_gets(true);
        assert!(store.get("k").await.is_err());
        assert_eq!(store.get_count(), 2);

        store.fail_gets(false);
        assert!(store.get("k").await.is_ok());
    }

    #[tokio::test]
    async fn direct_mutations_bypass_counters() {
        let store: MockTierStore<String> = MockTierStore::new();
        store.insert_direct("k", "v".to_string());
        store.remove_direct("k");
        assert_eq!(store.set_count(), 0);
        assert_eq!(store.del_count(), 0);
    }
}
