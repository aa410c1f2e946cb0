//! Side-channel notifications published when an asset is created.
//!
//! The contract treats a failed publish as a failed `CreateAsset`. The
//! world-state write has already been issued to the transaction by then; a
//! host that discards failed transactions drops it, a host that does not
//! would keep an asset whose creation was reported as failed. In the other
//! direction, a published event is never retracted if the transaction later
//! fails to commit.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("publish to {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },

    #[error("notification transport unavailable: {0}")]
    Unavailable(String),
}

/// Destination for asset events.
///
/// `publish` blocks until the event is accepted or refused.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), NotificationError>;
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), NotificationError> {
        (**self).publish(topic, payload)
    }
}

/// Payload of the event published after a successful create.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCreated<'a, A> {
    pub asset_id: &'a str,
    pub asset: &'a A,
}

/// Accepts every event and sends nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSink;

impl NotificationSink for NoOpSink {
    fn publish(&self, _topic: &str, _payload: &[u8]) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Writes every event to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), NotificationError> {
        info!(topic, payload = %String::from_utf8_lossy(payload), "asset event published");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Keeps every published event in memory, and can be told to refuse them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<PublishedMessage>>,
    failure: Mutex<Option<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every event with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        let sink = Self::new();
        sink.set_failure(Some(reason.into()));
        sink
    }

    /// Refuse subsequent events with `reason`, or accept them again with `None`.
    pub fn set_failure(&self, reason: Option<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = reason;
        }
    }

    /// Events accepted so far, oldest first.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), NotificationError> {
        let failure = self
            .failure
            .lock()
            .map_err(|_| NotificationError::Unavailable("sink lock poisoned".into()))?
            .clone();
        if let Some(reason) = failure {
            return Err(NotificationError::Rejected {
                topic: topic.to_string(),
                reason,
            });
        }
        self.messages
            .lock()
            .map_err(|_| NotificationError::Unavailable("sink lock poisoned".into()))?
            .push(PublishedMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
            });
        Ok(())
    }
}
