//! Tier store collaborators.
//!
//! Both cache tiers implement the same [`TierStore`] capability set; the
//! coordinator distinguishes them only by role (fast/local vs. slow/shared).
//! The crate ships [`MemoryStore`] as an in-process reference implementation
//! and a mock for tests; production tier2 backends live outside this crate.

pub mod error;
pub mod memory;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{TierError, TierResult};
pub use memory::MemoryStore;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTierStore;

use std::time::Duration;

use async_trait::async_trait;

/// Capability contract shared by both cache tiers.
///
/// Implementations must tolerate concurrent calls; the coordinator does not
/// serialize access to either tier.
#[async_trait]
pub trait TierStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Fetches a value. A missing key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> TierResult<Option<V>>;

    /// Stores a value. The TTL is a per-entry expiration hint enforced by
    /// the store itself, not by the coordinator.
    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> TierResult<()>;

    /// Removes a key. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> TierResult<()>;

    /// Reports presence without fetching the value.
    async fn has(&self, key: &str) -> TierResult<bool>;

    /// Drops every entry in the store.
    async fn reset(&self) -> TierResult<()>;
}
