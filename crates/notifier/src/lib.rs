//! Fire-and-forget notification sink.
//!
//! The order core never waits on a notification and never observes its
//! outcome: [`Notifier::notify`] is a non-blocking enqueue. The
//! queue-backed dispatcher hands messages to a [`Transport`] on a
//! background task; a failed send is logged and dropped, never retried
//! and never surfaced to the operation that triggered it.

mod dispatch;
mod transport;

pub use dispatch::{QueueNotifier, RecordingNotifier};
pub use transport::{LogTransport, NotifyError, RecordingTransport, Transport};

/// A message for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Creates a new notification.
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Hands a notification off for delivery.
///
/// Implementations must not block the caller on delivery and must not
/// report delivery failures back through this interface.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
