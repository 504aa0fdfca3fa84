//! Single-subscriber channel carrying fetch results to the session.
//!
//! A subscription is registered before a fetch starts and released when the
//! [`Subscription`] is dropped. Anything published after that point is
//! discarded rather than delivered to a session that no longer exists.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use planets_shared::Planet;
use tokio::sync::mpsc;

/// Sequence number of one fetch cycle within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(pub u64);

impl CycleId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one listing fetch. Exactly one is published per fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// Planets in server response order
    Success(Vec<Planet>),
    /// Human-readable diagnostic
    Failure(String),
}

/// A [`FetchEvent`] stamped with the cycle that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleEvent {
    pub cycle: CycleId,
    pub event: FetchEvent,
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Event channel already has an active subscriber")]
    AlreadySubscribed,

    #[error("Event channel closed")]
    Closed,
}

type Slot = Arc<Mutex<Option<mpsc::Sender<CycleEvent>>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<mpsc::Sender<CycleEvent>>> {
    // The guarded value is a plain Option, so a poisoned lock is still usable
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local publish/subscribe point for fetch events.
#[derive(Debug, Clone)]
pub struct EventChannel {
    slot: Slot,
    capacity: usize,
}

impl EventChannel {
    /// Create a channel buffering up to `capacity` undelivered events.
    ///
    /// # Panics
    /// Panics if capacity is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "EventChannel capacity must be > 0");
        Self {
            slot: Arc::new(Mutex::new(None)),
            capacity,
        }
    }

    /// Register the sole subscriber.
    pub fn subscribe(&self) -> Result<Subscription, ChannelError> {
        let mut slot = lock(&self.slot);
        if slot.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(ChannelError::AlreadySubscribed);
        }

        let (tx, rx) = mpsc::channel(self.capacity);
        *slot = Some(tx);
        Ok(Subscription {
            rx,
            slot: self.slot.clone(),
        })
    }

    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            slot: self.slot.clone(),
        }
    }

    pub fn has_subscriber(&self) -> bool {
        lock(&self.slot).as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

/// Sending half handed to fetch tasks.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    slot: Slot,
}

impl EventPublisher {
    /// Deliver an event to the current subscriber.
    ///
    /// Returns false if nobody is subscribed or the subscriber's buffer is
    /// full; the event is dropped in both cases.
    pub fn publish(&self, cycle: CycleId, event: FetchEvent) -> bool {
        let Some(tx) = lock(&self.slot).clone() else {
            tracing::debug!("No subscriber for fetch event of cycle {cycle}, dropping");
            return false;
        };

        match tx.try_send(CycleEvent { cycle, event }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Event buffer full, dropping fetch event of cycle {cycle}");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Subscriber gone, dropping fetch event of cycle {cycle}");
                false
            }
        }
    }
}

/// Receiving half, owned by the consuming session.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<CycleEvent>,
    slot: Slot,
}

impl Subscription {
    /// Wait for the next event, in publish order.
    ///
    /// Cancel-safe: dropping the future never loses an event.
    pub async fn recv(&mut self) -> Option<CycleEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<CycleEvent> {
        self.rx.try_recv().ok()
    }

    /// Discard everything already buffered, returning how many events went.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.rx.close();

        let mut slot = lock(&self.slot);
        if slot.as_ref().is_some_and(|tx| tx.is_closed()) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_ids_advance() {
        let first = CycleId::default().next();
        assert_eq!(first, CycleId(1));
        assert_eq!(first.next().to_string(), "#2");
    }

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let channel = EventChannel::new(4);
        let mut sub = channel.subscribe().unwrap();
        let publisher = channel.publisher();

        assert!(publisher.publish(CycleId(1), FetchEvent::Failure("first".into())));
        assert!(publisher.publish(CycleId(2), FetchEvent::Success(vec![])));

        let first = sub.recv().await.unwrap();
        assert_eq!(first.cycle, CycleId(1));
        assert_eq!(first.event, FetchEvent::Failure("first".into()));

        let second = sub.recv().await.unwrap();
        assert_eq!(second.cycle, CycleId(2));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_second_subscriber_rejected() {
        let channel = EventChannel::new(1);
        let _sub = channel.subscribe().unwrap();
        assert!(matches!(
            channel.subscribe(),
            Err(ChannelError::AlreadySubscribed)
        ));
    }

    #[test]
    fn test_dropping_subscription_releases_slot() {
        let channel = EventChannel::new(1);
        let publisher = channel.publisher();

        let sub = channel.subscribe().unwrap();
        assert!(channel.has_subscriber());
        drop(sub);

        assert!(!channel.has_subscriber());
        assert!(!publisher.publish(CycleId(1), FetchEvent::Success(vec![])));

        // A fresh session may subscribe again
        let mut sub = channel.subscribe().unwrap();
        assert!(publisher.publish(CycleId(2), FetchEvent::Success(vec![])));
        assert_eq!(sub.try_recv().unwrap().cycle, CycleId(2));
    }

    #[test]
    fn test_full_buffer_drops_event() {
        let channel = EventChannel::new(1);
        let _sub = channel.subscribe().unwrap();
        let publisher = channel.publisher();

        assert!(publisher.publish(CycleId(1), FetchEvent::Success(vec![])));
        assert!(!publisher.publish(CycleId(2), FetchEvent::Success(vec![])));
    }

    #[test]
    fn test_drain_empties_buffer() {
        let channel = EventChannel::new(2);
        let mut sub = channel.subscribe().unwrap();
        let publisher = channel.publisher();

        assert!(publisher.publish(CycleId(1), FetchEvent::Success(vec![])));
        assert!(publisher.publish(CycleId(2), FetchEvent::Success(vec![])));
        assert!(!publisher.publish(CycleId(3), FetchEvent::Success(vec![])));

        assert_eq!(sub.drain(), 2);
        assert!(publisher.publish(CycleId(4), FetchEvent::Success(vec![])));
        assert_eq!(sub.try_recv().unwrap().cycle, CycleId(4));
        assert_eq!(sub.drain(), 0);
    }

    #[test]
    fn test_publish_without_subscriber() {
        let channel = EventChannel::new(1);
        assert!(!channel
            .publisher()
            .publish(CycleId(1), FetchEvent::Failure("nobody home".into())));
    }
}
