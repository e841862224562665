use thiserror::Error;

#[derive(Debug, Error)]
/// Errors from the notification transport.
pub enum NotifyError {
    /// Establishing the subscription failed.
    #[error("subscribe failed: {reason}")]
    SubscribeFailed {
        /// Error message.
        reason: String,
    },
}
