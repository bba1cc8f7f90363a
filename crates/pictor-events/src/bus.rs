#![forbid(unsafe_code)]

use tokio::sync::broadcast;

use crate::{CacheEvent, Event, LoaderEvent};

/// Unified event bus for the delivery pipeline.
///
/// All components receive a cloned `EventBus` and publish events directly.
/// Subscribers receive all events from all components.
///
/// `publish()` is a sync call — works from both async tasks and blocking
/// threads. If there are no subscribers, events are silently dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all subscribers.
    ///
    /// Accepts any type that converts `Into<Event>`, so you can pass
    /// sub-enum values directly: `bus.publish(LoaderEvent::Loaded { .. })`.
    pub fn publish<E: Into<Event>>(&self, event: E) {
        let _ = self.tx.send(event.into());
    }

    /// Subscribe to all future events.
    ///
    /// Each subscriber gets an independent receiver. Slow subscribers
    /// receive `RecvError::Lagged(n)` instead of blocking producers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Subscribe to loader events only.
    #[must_use]
    pub fn subscribe_loader(&self) -> LoaderEvents {
        LoaderEvents {
            rx: self.tx.subscribe(),
        }
    }

    /// Subscribe to cache worker events only.
    #[must_use]
    pub fn subscribe_cache(&self) -> CacheEvents {
        CacheEvents {
            rx: self.tx.subscribe(),
        }
    }
}

/// Filtered subscription that yields only [`LoaderEvent`]s.
///
/// Other subsystems' events and lag gaps are skipped silently.
pub struct LoaderEvents {
    rx: broadcast::Receiver<Event>,
}

impl LoaderEvents {
    /// Next loader event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<LoaderEvent> {
        loop {
            match self.rx.recv().await {
                Ok(Event::Loader(event)) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Filtered subscription that yields only [`CacheEvent`]s.
///
/// Other subsystems' events and lag gaps are skipped silently.
pub struct CacheEvents {
    rx: broadcast::Receiver<Event>,
}

impl CacheEvents {
    /// Next cache event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<CacheEvent> {
        loop {
            match self.rx.recv().await {
                Ok(Event::Cache(event)) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
