//! In-process notification source for tests.

use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::error::NotifyError;
use super::{KeyEvent, KeyEventKind, KeyEventStream, NotificationSource};

/// Channel-backed source: tests push events with [`MockNotificationSource::emit`].
///
/// Supports a single subscriber, mirroring transports that require a
/// dedicated subscriber connection.
pub struct MockNotificationSource {
    tx: mpsc::UnboundedSender<KeyEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<KeyEvent>>>,
    pattern: Mutex<Option<String>>,
}

impl MockNotificationSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            pattern: Mutex::new(None),
        }
    }

    /// Delivers a key event to the subscriber. Events emitted before
    /// `subscribe` are buffered.
    pub fn emit(&self, key: &str, kind: KeyEventKind) {
        let event = KeyEvent {
            key: key.to_string(),
            channel: self.channel_for(kind),
            kind,
        };
        let _ = self.tx.send(event);
    }

    /// The pattern the subscriber registered, if any.
    pub fn subscribed_pattern(&self) -> Option<String> {
        self.pattern.lock().clone()
    }

    fn channel_for(&self, kind: KeyEventKind) -> String {
        match self.pattern.lock().as_deref() {
            Some(pattern) => pattern.replace('*', kind.as_str()),
            None => format!("__keyevent@0__:{}", kind.as_str()),
        }
    }
}

impl Default for MockNotificationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockNotificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNotificationSource")
            .field("pattern", &self.subscribed_pattern())
            .finish()
    }
}

#[async_trait]
impl NotificationSource for MockNotificationSource {
    async fn subscribe(&self, pattern: &str) -> Result<KeyEventStream, NotifyError> {
        let rx = self
            .rx
            .lock()
            .take()
            .ok_or_else(|| NotifyError::SubscribeFailed {
                reason: "mock source supports a single subscriber".to_string(),
            })?;
        *self.pattern.lock() = Some(pattern.to_string());
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}
