//! Delivery transports for the notification dispatcher.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::Notification;

/// Errors a transport can report to the dispatcher.
///
/// These never travel further than the dispatcher, which logs and drops
/// them.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The delivery channel rejected the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivers a single notification to the outside world.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Transport that writes notifications to the log.
///
/// The real mail system lives outside this codebase; this is the default
/// sink for local runs.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl LogTransport {
    /// Creates a new log transport.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            "notification dispatched"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<Notification>,
    attempted: usize,
    fail_on_send: bool,
}

/// In-memory transport for testing the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingTransport {
    /// Creates a new recording transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the transport to fail every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the number of delivered notifications.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns the number of send attempts, including failed ones.
    pub fn attempted_count(&self) -> usize {
        self.state.read().unwrap().attempted
    }

    /// Returns a copy of all delivered notifications.
    pub fn sent(&self) -> Vec<Notification> {
        self.state.read().unwrap().sent.clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut state = self.state.write().unwrap();
        state.attempted += 1;
        if state.fail_on_send {
            return Err(NotifyError::Delivery("recording transport set to fail".to_string()));
        }
        state.sent.push(notification.clone());
        Ok(())
    }
}
