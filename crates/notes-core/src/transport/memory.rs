//! In-process transport.
//!
//! Keeps every topic as a vector in memory and fans publishes out to live
//! handlers synchronously. Sequence numbers are 1-based positions in the
//! topic. Useful for tests and for embedding the directory without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::trace;

use super::traits::{
    HistoryPage, MessageHandler, RawMessage, SubscriptionHandle, Topic, Transport,
};
use crate::error::TransportError;

/// Default number of messages per history page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Default)]
struct MemoryState {
    topics: HashMap<Topic, Vec<RawMessage>>,
    subscribers: HashMap<Topic, Vec<(u64, MessageHandler)>>,
    next_subscriber_id: u64,
}

/// Process-local pub/sub transport.
#[derive(Clone)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
    page_size: usize,
    available: Arc<AtomicBool>,
    history_queries: Arc<AtomicUsize>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            page_size: DEFAULT_PAGE_SIZE,
            available: Arc::new(AtomicBool::new(true)),
            history_queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the number of messages returned per history page (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Simulate the transport going offline (`false`) or coming back (`true`).
    ///
    /// While offline every operation fails with `TransportError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of history pages served so far.
    pub fn history_queries(&self) -> usize {
        self.history_queries.load(Ordering::SeqCst)
    }

    /// Number of live handlers currently registered on `topic`.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.lock_state()
            .map(|state| state.subscribers.get(topic).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Number of messages stored on `topic`.
    pub fn message_count(&self, topic: &Topic) -> usize {
        self.lock_state()
            .map(|state| state.topics.get(topic).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, MemoryState>, TransportError> {
        self.state
            .lock()
            .map_err(|_| TransportError::Storage("memory transport poisoned".to_string()))
    }

    fn ensure_available(&self) -> Result<(), TransportError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TransportError::Unavailable(
                "memory transport is offline".to_string(),
            ))
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(
        &self,
        topic: &Topic,
        payload: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), TransportError> {
        self.ensure_available()?;

        let (message, handlers) = {
            let mut state = self.lock_state()?;
            let messages = state.topics.entry(topic.clone()).or_default();
            let sequence = messages.len() as u64 + 1;
            let message = RawMessage::new(payload)
                .with_timestamp(timestamp)
                .with_sequence(sequence);
            messages.push(message.clone());

            let handlers: Vec<MessageHandler> = state
                .subscribers
                .get(topic)
                .map(|subs| subs.iter().map(|(_, handler)| Arc::clone(handler)).collect())
                .unwrap_or_default();
            (message, handlers)
        };

        trace!(
            topic = %topic,
            sequence = ?message.sequence,
            handlers = handlers.len(),
            "published"
        );
        for handler in handlers {
            handler(message.clone());
        }
        Ok(())
    }

    async fn query_history(
        &self,
        topic: &Topic,
        cursor: Option<u64>,
    ) -> Result<HistoryPage, TransportError> {
        self.ensure_available()?;
        self.history_queries.fetch_add(1, Ordering::SeqCst);

        let state = self.lock_state()?;
        let Some(messages) = state.topics.get(topic) else {
            return Ok(HistoryPage::default());
        };

        let start = cursor.unwrap_or(0) as usize;
        let page: Vec<RawMessage> = messages
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let end = start + page.len();
        let next_cursor = (end < messages.len()).then_some(end as u64);

        Ok(HistoryPage {
            messages: page,
            next_cursor,
        })
    }

    async fn subscribe(
        &self,
        topic: &Topic,
        resume_after: Option<u64>,
        handler: MessageHandler,
    ) -> Result<Box<dyn SubscriptionHandle>, TransportError> {
        self.ensure_available()?;

        let (id, tail) = {
            let mut state = self.lock_state()?;
            let id = state.next_subscriber_id;
            state.next_subscriber_id += 1;

            let tail: Vec<RawMessage> = match resume_after {
                Some(seen) => state
                    .topics
                    .get(topic)
                    .map(|messages| messages.iter().skip(seen as usize).cloned().collect())
                    .unwrap_or_default(),
                None => Vec::new(),
            };

            state
                .subscribers
                .entry(topic.clone())
                .or_default()
                .push((id, Arc::clone(&handler)));
            (id, tail)
        };

        trace!(topic = %topic, replayed = tail.len(), "subscribed");
        for message in tail {
            handler(message);
        }

        Ok(Box::new(MemorySubscription {
            state: Arc::clone(&self.state),
            topic: topic.clone(),
            id,
        }))
    }
}

struct MemorySubscription {
    state: Arc<Mutex<MemoryState>>,
    topic: Topic,
    id: u64,
}

impl SubscriptionHandle for MemorySubscription {
    fn unsubscribe(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(subs) = state.subscribers.get_mut(&self.topic) {
                subs.retain(|(id, _)| *id != self.id);
            }
        }
    }
}
