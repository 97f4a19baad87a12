//! Error types for the `life-events` crate.

/// Failure reported by a listener while handling a notification.
///
/// A failing listener never stops delivery to the listeners attached after
/// it; the channel logs the failure and counts it in the [`Delivery`]
/// report.
///
/// [`Delivery`]: crate::Delivery
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener failed: {message}")]
pub struct ListenerError {
    /// Description of what went wrong inside the listener.
    pub message: String,
}

impl ListenerError {
    /// Create a listener error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
