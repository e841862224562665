//! Environment-backed configuration.
//!
//! All settings have defaults. Override with `STRATA_*` environment
//! variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;

/// Invalidation subscription configuration.
///
/// Use [`InvalidationConfig::from_env`] to read `STRATA_*` overrides on top
/// of defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationConfig {
    /// Logical database/partition index of the backing store whose keyspace
    /// notifications are subscribed to. Default: `0`.
    pub db_index: u32,

    /// Explicit channel pattern override. When `None`, the pattern is
    /// derived from `db_index` as `__keyevent@{db}__:*`.
    pub channel_pattern: Option<String>,

    /// Capacity of the observable event broadcast channel. Default: `1024`.
    pub event_capacity: usize,
}

impl Default for InvalidationConfig {
    fn default() -> Self {
        Self {
            db_index: 0,
            channel_pattern: None,
            event_capacity: 1024,
        }
    }
}

impl InvalidationConfig {
    const ENV_DB_INDEX: &'static str = "STRATA_DB_INDEX";
    const ENV_CHANNEL_PATTERN: &'static str = "STRATA_CHANNEL_PATTERN";
    const ENV_EVENT_CAPACITY: &'static str = "STRATA_EVENT_CAPACITY";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let db_index = match env::var(Self::ENV_DB_INDEX) {
            Ok(value) => value
                .parse::<u32>()
                .map_err(|source| ConfigError::InvalidDbIndex { value, source })?,
            Err(_) => defaults.db_index,
        };

        let channel_pattern = env::var(Self::ENV_CHANNEL_PATTERN).ok();

        let event_capacity = match env::var(Self::ENV_EVENT_CAPACITY) {
            Ok(value) => value
                .parse::<usize>()
                .map_err(|source| ConfigError::InvalidEventCapacity { value, source })?,
            Err(_) => defaults.event_capacity,
        };

        Ok(Self {
            db_index,
            channel_pattern,
            event_capacity,
        })
    }

    /// The pattern passed to the notification source: the override when
    /// given, otherwise the keyspace-notification pattern for `db_index`.
    pub fn channel_pattern(&self) -> String {
        match &self.channel_pattern {
            Some(pattern) => pattern.clone(),
            None => format!("__keyevent@{}__:*", self.db_index),
        }
    }

    /// Validates basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        if let Some(pattern) = &self.channel_pattern {
            if pattern.is_empty() {
                return Err(ConfigError::EmptyChannelPattern);
            }
        }
        Ok(())
    }
}
