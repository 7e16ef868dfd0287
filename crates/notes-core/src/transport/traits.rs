//! Transport trait definition.
//!
//! The `Transport` trait is the interface the note directory consumes from a
//! pub/sub substrate: publish to a topic, page through a topic's history, and
//! subscribe to its live feed. Implementations own delivery; the directory
//! owns merging.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TransportError;

/// A named channel on the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Validate and wrap a topic name.
    ///
    /// Names must be non-empty and contain no whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, TransportError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TransportError::Rejected(
                "topic name cannot be empty".to_string(),
            ));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(TransportError::Rejected(format!(
                "topic name cannot contain whitespace: {:?}",
                name
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Opaque payload bytes (app defines format)
    pub payload: Vec<u8>,

    /// Publisher-supplied timestamp, if the transport carries one
    pub timestamp: Option<DateTime<Utc>>,

    /// Position within the topic, if the transport assigns one
    pub sequence: Option<u64>,
}

impl RawMessage {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            timestamp: None,
            sequence: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// One page of a history query.
#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    /// Messages in topic order
    pub messages: Vec<RawMessage>,

    /// Cursor for the next page; `None` once history is drained
    pub next_cursor: Option<u64>,
}

/// Callback invoked for every live message.
pub type MessageHandler = Arc<dyn Fn(RawMessage) + Send + Sync>;

/// Handle to an open live subscription.
pub trait SubscriptionHandle: Send + Sync {
    /// Stop delivery. Calling this more than once is a no-op.
    fn unsubscribe(&self);
}

/// Pub/sub transport interface.
///
/// All implementations must ensure:
/// - `publish` either stores/forwards the payload or returns an error
/// - `query_history` pages in topic order; a `None` cursor starts from the beginning
/// - `subscribe` delivers each live message to the handler at least once
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish a payload to a topic.
    async fn publish(
        &self,
        topic: &Topic,
        payload: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), TransportError>;

    /// Fetch one page of a topic's history starting after `cursor`.
    async fn query_history(
        &self,
        topic: &Topic,
        cursor: Option<u64>,
    ) -> Result<HistoryPage, TransportError>;

    /// Open a live subscription.
    ///
    /// `resume_after` is the highest sequence the caller has already seen.
    /// Transports that assign sequences deliver everything after it, so no
    /// message falls between a backfill and the live feed. Transports that
    /// cannot resume start from "now".
    async fn subscribe(
        &self,
        topic: &Topic,
        resume_after: Option<u64>,
        handler: MessageHandler,
    ) -> Result<Box<dyn SubscriptionHandle>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_validation() {
        assert!(Topic::new("/shared-notes/1/note/json").is_ok());
        assert!(Topic::new("").is_err());
        assert!(Topic::new("has space").is_err());
        assert_eq!(Topic::new("t").unwrap().to_string(), "t");
    }

    #[test]
    fn test_raw_message_builder() {
        let now = Utc::now();
        let message = RawMessage::new(b"hi".to_vec())
            .with_timestamp(now)
            .with_sequence(7);
        assert_eq!(message.payload, b"hi");
        assert_eq!(message.timestamp, Some(now));
        assert_eq!(message.sequence, Some(7));
    }

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_transport(_transport: Arc<dyn Transport>) {}
    }
}
