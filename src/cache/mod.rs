//! The coordinator core: inflight fetch dedup and the tiered read-through
//! cache.

pub mod error;
mod inflight;
pub mod tiered;

#[cfg(test)]
mod inflight_tests;

pub use error::{CacheError, CacheResult};
pub use tiered::{TieredCache, TieredCacheHandle};
