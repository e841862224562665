//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Database index string could not be parsed as a number.
    #[error("failed to parse db index '{value}': {source}")]
    InvalidDbIndex {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Event capacity string could not be parsed as a number.
    #[error("failed to parse event capacity '{value}': {source}")]
    InvalidEventCapacity {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Event capacity must be at least 1 (broadcast channels reject 0).
    #[error("event capacity must be greater than zero")]
    ZeroEventCapacity,

    /// A channel pattern override was given but is empty.
    #[error("channel pattern override must not be empty")]
    EmptyChannelPattern,
}
