#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Catalog event bus for the Lingo workspace.
//!
//! The bus carries a typed event enum with sequential identifiers and keeps a
//! bounded replay buffer so reconnecting subscribers (SSE clients sending
//! `Last-Event-ID`) can catch up. Internally it uses `tokio::broadcast`; when a
//! subscriber lags, the oldest events are dropped for that subscriber.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Monotonic identifier assigned to each published event.
pub type EventId = u64;

const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Catalog lifecycle events surfaced to editor clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The API rewrote a catalog after applying updates.
    CatalogUpdated {
        /// Language code of the rewritten catalog.
        code: String,
        /// Number of patches that matched an entry.
        applied: usize,
        /// Number of patches ignored because their entry was absent.
        ignored: usize,
    },
    /// A catalog file appeared or was modified on disk.
    CatalogChanged {
        /// Language code derived from the file stem.
        code: String,
        /// Path of the changed file.
        path: String,
    },
    /// A catalog file disappeared from the locales directory.
    CatalogRemoved {
        /// Language code derived from the file stem.
        code: String,
        /// Path of the removed file.
        path: String,
    },
}

impl Event {
    /// Machine-readable discriminator, matching the serialized `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CatalogUpdated { .. } => "catalog_updated",
            Self::CatalogChanged { .. } => "catalog_changed",
            Self::CatalogRemoved { .. } => "catalog_removed",
        }
    }

    /// Language code the event refers to.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::CatalogUpdated { code, .. }
            | Self::CatalogChanged { code, .. }
            | Self::CatalogRemoved { code, .. } => code,
        }
    }
}

/// Event plus the metadata assigned at publish time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential identifier.
    pub id: EventId,
    /// Publish timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event payload.
    pub event: Event,
}

/// Cloneable handle to the shared broadcast channel.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Build a bus whose channel and replay buffer hold `capacity` events.
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Build a bus with the default replay capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish an event to every subscriber and record it for replay.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.buffer();
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        // No subscribers is not an error; the replay buffer still holds the event.
        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to future events, replaying buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let receiver = self.sender.subscribe();
        let backlog: VecDeque<EventEnvelope> = since_id.map_or_else(VecDeque::new, |since| {
            self.buffer()
                .iter()
                .filter(|item| item.id > since)
                .cloned()
                .collect()
        });
        let replayed_up_to = backlog.back().map(|event| event.id);
        EventStream {
            backlog,
            receiver,
            replayed_up_to,
        }
    }

    /// Identifier of the most recently published event still in the buffer.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.buffer().back().map(|event| event.id)
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber view over the bus: replay backlog first, then live events.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
    replayed_up_to: Option<EventId>,
}

impl EventStream {
    /// Receive the next event, draining the replay backlog first.
    ///
    /// Live events already delivered through the backlog are skipped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            match self.receiver.recv().await {
                Ok(event) if self.replayed_up_to.is_some_and(|id| event.id <= id) => {}
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::task;
    use tokio::time::timeout;

    const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

    fn sample_update(index: usize) -> Event {
        Event::CatalogUpdated {
            code: format!("lang-{index}"),
            applied: index,
            ignored: 0,
        }
    }

    #[tokio::test]
    async fn sequential_ids_and_replay() {
        let bus = EventBus::with_capacity(16);

        let mut last_id = 0;
        for i in 0..5 {
            last_id = bus.publish(sample_update(i));
        }
        assert_eq!(last_id, 5);
        assert_eq!(bus.last_event_id(), Some(5));

        let mut stream = bus.subscribe(Some(2));
        let mut received = Vec::new();
        for _ in 0..3 {
            if let Some(event) = stream.next().await {
                received.push(event.id);
            }
        }

        assert_eq!(received, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn replay_buffer_evicts_oldest_events() {
        let bus = EventBus::with_capacity(2);
        for i in 0..4 {
            let _ = bus.publish(sample_update(i));
        }

        let mut stream = bus.subscribe(Some(0));
        let first = stream.next().await.map(|event| event.id);
        let second = stream.next().await.map(|event| event.id);
        assert_eq!(first, Some(3));
        assert_eq!(second, Some(4));
    }

    #[tokio::test]
    async fn live_subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut stream = bus.subscribe(None);

        let publisher = {
            let bus = bus.clone();
            task::spawn(async move {
                for i in 0..50 {
                    let _ = bus.publish(sample_update(i));
                }
            })
        };

        let mut ids = HashSet::new();
        while ids.len() < 50 {
            let next = timeout(RECEIVE_TIMEOUT, stream.next())
                .await
                .expect("event delivery timed out");
            if let Some(event) = next {
                ids.insert(event.id);
            }
        }
        publisher.await.expect("publisher task panicked");
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let event = Event::CatalogChanged {
            code: "fr".into(),
            path: "locales/fr.po".into(),
        };
        let json = serde_json::to_value(&event).expect("serialize event");
        assert_eq!(json["type"], "catalog_changed");
        assert_eq!(json["code"], "fr");
        assert_eq!(event.kind(), "catalog_changed");
        assert_eq!(event.code(), "fr");
    }
}
