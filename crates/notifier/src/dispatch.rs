//! Queue-backed dispatch and the test notifier.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use crate::{Notification, Notifier, transport::Transport};

/// Notifier that enqueues onto an unbounded channel drained by a
/// background task.
///
/// `notify` returns as soon as the message is queued. The dispatcher
/// task forwards each message to its transport; a failed send is logged
/// at warn level and dropped.
#[derive(Debug, Clone)]
pub struct QueueNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl QueueNotifier {
    /// Spawns the dispatcher task on the current tokio runtime and
    /// returns the enqueue handle.
    pub fn spawn<T: Transport + 'static>(transport: T) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                if let Err(error) = transport.send(&notification).await {
                    tracing::warn!(
                        recipient = %notification.recipient,
                        subject = %notification.subject,
                        %error,
                        "notification delivery failed, dropping"
                    );
                }
            }
        });

        Self { tx }
    }
}

impl Notifier for QueueNotifier {
    fn notify(&self, notification: Notification) {
        // The receiver only closes on shutdown; a failed enqueue is as
        // unobservable as a failed delivery.
        let _ = self.tx.send(notification);
    }
}

/// Notifier that records messages synchronously for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Creates a new recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of notifications handed off.
    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }

    /// Returns a copy of all notifications handed off.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.read().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.write().unwrap().push(notification);
    }
}
