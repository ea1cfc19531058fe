// Copyright 2025 Cowboy AI, LLC.

//! Search lifecycle event bus
//!
//! Listeners are called synchronously, in subscription order, on the thread
//! that runs the search. Async consumers can take a broadcast stream instead;
//! a lagging stream drops events rather than slowing the search down.

use super::SearchTriggerEvent;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

type Listener = Arc<dyn Fn(&SearchTriggerEvent) + Send + Sync>;

/// Handle returned by [`SearchEventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Publishes [`SearchTriggerEvent`]s to listeners and stream subscribers
pub struct SearchEventBus {
    listeners: RwLock<IndexMap<ListenerId, Listener>>,
    next_id: AtomicU64,
    sender: broadcast::Sender<SearchTriggerEvent>,
}

impl SearchEventBus {
    /// Default broadcast buffer per stream subscriber
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a bus whose streams buffer up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            listeners: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            sender,
        }
    }

    /// Register a synchronous listener
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SearchTriggerEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(&id)
            .is_some()
    }

    /// Receive every event published from now on as a stream
    pub fn stream(&self) -> BroadcastStream<SearchTriggerEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Number of registered synchronous listeners
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every listener, then to stream subscribers
    pub fn publish(&self, event: SearchTriggerEvent) {
        // Listeners may subscribe or unsubscribe re-entrantly, so call them
        // outside the lock.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in &listeners {
            listener(&event);
        }

        if self.sender.receiver_count() > 0 && self.sender.send(event).is_err() {
            trace!("Search event stream subscribers went away mid-publish");
        }
    }
}

impl Default for SearchEventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for SearchEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEventBus")
            .field("listeners", &self.listener_count())
            .field("stream_subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchDomain;
    use futures::StreamExt;
    use std::sync::Mutex;

    fn started(at: i64) -> SearchTriggerEvent {
        SearchTriggerEvent::QueryStarted {
            at,
            query: "orders".into(),
            domains: vec![SearchDomain::Orders],
        }
    }

    #[test]
    fn test_listeners_receive_in_order_until_unsubscribed() {
        let bus = SearchEventBus::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = bus.subscribe(move |event| {
            if let SearchTriggerEvent::QueryStarted { at, .. } = event {
                sink.lock().expect("lock").push(*at);
            }
        });

        bus.publish(started(1));
        bus.publish(started(2));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(started(3));

        assert_eq!(*seen.lock().expect("lock"), vec![1, 2]);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = SearchEventBus::new(1);
        bus.publish(started(1));
    }

    #[tokio::test]
    async fn test_stream_receives_published_events() {
        let bus = SearchEventBus::default();
        let mut stream = bus.stream();

        bus.publish(started(10));
        bus.publish(started(11));

        let first = stream.next().await.expect("event").expect("not lagged");
        let second = stream.next().await.expect("event").expect("not lagged");
        assert_eq!(first, started(10));
        assert_eq!(second, started(11));
    }
}
