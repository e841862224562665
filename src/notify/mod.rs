//! Key-change notification source.
//!
//! The coordinator learns about tier2 mutations performed by other processes
//! (or by tier2's own expiration) through a subscribable stream of key
//! events, scoped by a channel pattern such as `__keyevent@0__:*`. Delivery
//! is best-effort: duplicates are harmless and missed events only widen the
//! staleness window.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::NotifyError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockNotificationSource;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// What happened to the key in the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// The key was deleted.
    Del,
    /// The key expired.
    Expire,
}

impl KeyEventKind {
    /// The event-class suffix used in keyspace notification channels.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyEventKind::Del => "del",
            KeyEventKind::Expire => "expired",
        }
    }
}

/// A single key-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The affected key.
    pub key: String,
    /// The concrete channel the event arrived on.
    pub channel: String,
    /// Delete vs. expire.
    pub kind: KeyEventKind,
}

/// Stream of key events delivered by a subscription.
pub type KeyEventStream = BoxStream<'static, KeyEvent>;

/// A subscribable source of key-change events.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Subscribes to events matching `pattern` and returns the delivery
    /// stream. The subscription is dedicated: transports that multiplex
    /// must hand out an independent consumer per call.
    async fn subscribe(&self, pattern: &str) -> Result<KeyEventStream, NotifyError>;
}
