use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Errors produced by tier store collaborators.
///
/// Clone so a single failed tier2 fetch can be handed to every caller
/// sharing the inflight future and mirrored onto the event bus.
pub enum TierError {
    /// The backing store is unreachable (network down, connection refused).
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },

    /// The store accepted the call but the operation failed.
    #[error("store operation failed: {reason}")]
    Backend {
        /// Error message.
        reason: String,
    },

    /// The store did not answer within its own deadline.
    #[error("store operation timed out: {reason}")]
    Timeout {
        /// Error message.
        reason: String,
    },
}

/// Convenience result type for tier store operations.
pub type TierResult<T> = Result<T, TierError>;
