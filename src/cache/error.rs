use thiserror::Error;

use crate::config::ConfigError;
use crate::notify::NotifyError;
use crate::store::TierError;

#[derive(Debug, Error)]
/// Errors returned by the tiered cache coordinator.
pub enum CacheError {
    /// The fast/local tier failed.
    #[error("tier1 error: {0}")]
    Tier1(#[source] TierError),

    /// The slow/shared tier failed.
    #[error("tier2 error: {0}")]
    Tier2(#[source] TierError),

    /// Establishing the invalidation subscription failed at construction.
    #[error("invalidation subscription failed: {0}")]
    Subscribe(#[from] NotifyError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience result type for coordinator operations.
pub type CacheResult<T> = Result<T, CacheError>;
