//! Broadcaster - fan-out of pushed payloads to live subscribers

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, instrument, trace};

use contracts::{StreamEvent, Subscriber, SubscriberId};

use crate::error::DispatcherError;
use crate::event_id::EventIdGenerator;
use crate::handle::{ChannelSubscriber, Subscription};
use crate::metrics::{BroadcastMetrics, MetricsSnapshot};

/// Smallest channel that holds the handshake plus the cached payload
const MIN_CHANNEL_CAPACITY: usize = 2;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub pruned: usize,
}

struct Inner {
    subscribers: RwLock<HashMap<SubscriberId, Arc<dyn Subscriber>>>,
    /// Last payload broadcast; replayed to each new subscriber
    last_payload: RwLock<Option<Arc<str>>>,
    ids: EventIdGenerator,
    next_subscriber: AtomicU64,
    metrics: BroadcastMetrics,
}

/// Handle to the shared fan-out state
///
/// Cloning is cheap; all clones address the same subscriber set.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                subscribers: RwLock::new(HashMap::new()),
                last_payload: RwLock::new(None),
                ids: EventIdGenerator::new(),
                next_subscriber: AtomicU64::new(1),
                metrics: BroadcastMetrics::new(),
            }),
        }
    }

    /// Allocate an id for a caller-built subscriber
    pub fn next_subscriber_id(&self) -> SubscriberId {
        SubscriberId(self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a subscriber
    ///
    /// The handshake is sent first and its failure is ignored. The cached
    /// payload, if any, goes to this subscriber only; if that delivery fails
    /// the subscriber is not kept. Both sends happen under the set lock so no
    /// broadcast can reach the subscriber ahead of its handshake.
    #[instrument(name = "broadcaster_subscribe", skip(self, subscriber), fields(subscriber = %subscriber.id()))]
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = subscriber.id();
        let mut subscribers = self.inner.subscribers.write();

        if let Err(e) = subscriber.deliver(StreamEvent::handshake(self.inner.ids.next_id())) {
            self.inner.metrics.inc_handshake_failures();
            debug!(error = %e, "handshake not delivered");
        }

        let cached = self.inner.last_payload.read().clone();
        if let Some(data) = cached {
            let replayed = subscriber.deliver(StreamEvent::message(self.inner.ids.next_id(), data));
            self.inner.metrics.record_replay(replayed.is_ok());
            if let Err(e) = replayed {
                debug!(error = %e, "cached payload not delivered, subscriber dropped");
                return id;
            }
        }

        subscribers.insert(id, subscriber);
        self.inner.metrics.set_subscribers(subscribers.len());
        debug!(subscribers = subscribers.len(), "subscriber registered");
        id
    }

    /// Register a bounded channel subscriber
    ///
    /// `capacity` is raised to at least 2 so the handshake and the cached
    /// payload always fit.
    pub fn subscribe_channel(&self, capacity: usize) -> Subscription {
        let id = self.next_subscriber_id();
        let (subscriber, rx) = ChannelSubscriber::new(id, capacity.max(MIN_CHANNEL_CAPACITY));
        self.subscribe(Arc::new(subscriber));
        Subscription::new(id, rx, self.clone())
    }

    /// Remove a subscriber; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.inner.subscribers.write();
        let removed = subscribers.remove(&id).is_some();
        if removed {
            self.inner.metrics.set_subscribers(subscribers.len());
            trace!(subscriber = %id, "subscriber removed");
        }
        removed
    }

    /// Serialize `payload` and broadcast it
    pub fn broadcast<T>(&self, payload: &T) -> Result<BroadcastReport, DispatcherError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_string(payload)?;
        Ok(self.broadcast_raw(data))
    }

    /// Cache `data` as the last payload and push it to every subscriber
    ///
    /// The cache write and the copy of the target set happen under the set
    /// lock, so a concurrent `subscribe` either receives this payload as its
    /// replay or as a broadcast, never both. Delivery runs over the copy,
    /// outside the lock. Every subscriber whose delivery fails is removed;
    /// there is no retry.
    #[instrument(name = "broadcaster_broadcast", skip(self, data))]
    pub fn broadcast_raw(&self, data: impl Into<Arc<str>>) -> BroadcastReport {
        let data: Arc<str> = data.into();

        // Same lock order as `subscribe`: set, then cache
        let targets: Vec<Arc<dyn Subscriber>> = {
            let subscribers = self.inner.subscribers.read();
            *self.inner.last_payload.write() = Some(Arc::clone(&data));
            subscribers.values().cloned().collect()
        };

        let id = self.inner.ids.next_id();
        let mut failed = Vec::new();
        let mut delivered = 0;
        for subscriber in &targets {
            match subscriber.deliver(StreamEvent::message(id.clone(), Arc::clone(&data))) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    debug!(subscriber = %subscriber.id(), error = %e, "delivery failed");
                    failed.push(subscriber.id());
                }
            }
        }

        let pruned = if failed.is_empty() {
            0
        } else {
            let mut subscribers = self.inner.subscribers.write();
            let pruned = failed
                .iter()
                .filter(|id| subscribers.remove(*id).is_some())
                .count();
            self.inner.metrics.set_subscribers(subscribers.len());
            pruned
        };

        self.inner.metrics.record_broadcast(delivered, pruned);
        trace!(event_id = %id, delivered, pruned, bytes = data.len(), "broadcast complete");

        BroadcastReport { delivered, pruned }
    }

    /// Last payload broadcast, if any
    pub fn last_payload(&self) -> Option<Arc<str>> {
        self.inner.last_payload.read().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.inner.subscribers.read().contains_key(&id)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, HANDSHAKE_EVENT, MESSAGE_EVENT};
    use futures_util::StreamExt;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Accepts the handshake, then fails every delivery
    struct BrokenSubscriber {
        id: SubscriberId,
        received: Mutex<Vec<StreamEvent>>,
    }

    impl BrokenSubscriber {
        fn new(id: SubscriberId) -> Self {
            Self {
                id,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    impl Subscriber for BrokenSubscriber {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn deliver(&self, event: StreamEvent) -> Result<(), ContractError> {
            if event.is_handshake() {
                self.received.lock().push(event);
                Ok(())
            } else {
                Err(ContractError::SubscriberClosed {
                    subscriber: self.id,
                })
            }
        }
    }

    #[tokio::test]
    async fn test_handshake_precedes_data() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe_channel(8);

        broadcaster.broadcast_raw("{\"a\":1}");

        let hello = sub.recv().await.unwrap();
        assert_eq!(hello.name, HANDSHAKE_EVENT);
        assert_eq!(&*hello.data, "connection successful!");

        let message = sub.recv().await.unwrap();
        assert_eq!(message.name, MESSAGE_EVENT);
        assert_eq!(&*message.data, "{\"a\":1}");
        assert!(message.id.parse::<i64>().unwrap() > hello.id.parse::<i64>().unwrap());
    }

    #[tokio::test]
    async fn test_no_cached_payload_sends_only_handshake() {
        let broadcaster = Broadcaster::new();
        let mut sub = broadcaster.subscribe_channel(8);

        assert!(sub.try_recv().unwrap().is_handshake());
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_late_joiner_gets_last_payload_only() {
        let broadcaster = Broadcaster::new();
        let mut early = broadcaster.subscribe_channel(8);

        broadcaster.broadcast_raw("first");
        broadcaster.broadcast_raw("second");
        let mut late = broadcaster.subscribe_channel(8);
        broadcaster.broadcast_raw("third");

        assert!(late.recv().await.unwrap().is_handshake());
        assert_eq!(&*late.recv().await.unwrap().data, "second");
        assert_eq!(&*late.recv().await.unwrap().data, "third");
        assert!(late.try_recv().is_none());

        // The replay went to the new subscriber only
        let early_data: Vec<String> = std::iter::from_fn(|| early.try_recv())
            .skip(1)
            .map(|e| e.data.to_string())
            .collect();
        assert_eq!(early_data, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failed_subscriber_pruned_others_receive() {
        let broadcaster = Broadcaster::new();
        let broken = Arc::new(BrokenSubscriber::new(broadcaster.next_subscriber_id()));
        let broken_id = broadcaster.subscribe(broken.clone());
        let mut healthy = broadcaster.subscribe_channel(8);
        assert_eq!(broadcaster.subscriber_count(), 2);

        let first = broadcaster.broadcast(&json!({"n": 1})).unwrap();
        assert_eq!(
            first,
            BroadcastReport {
                delivered: 1,
                pruned: 1
            }
        );
        assert!(!broadcaster.is_subscribed(broken_id));

        let second = broadcaster.broadcast(&json!({"n": 2})).unwrap();
        assert_eq!(second.delivered, 1);
        assert_eq!(second.pruned, 0);

        let data: Vec<String> = std::iter::from_fn(|| healthy.try_recv())
            .filter(|e| !e.is_handshake())
            .map(|e| e.data.to_string())
            .collect();
        assert_eq!(data, vec!["{\"n\":1}", "{\"n\":2}"]);
        assert_eq!(broken.received.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_pruned() {
        let broadcaster = Broadcaster::new();
        let mut slow = broadcaster.subscribe_channel(2);

        broadcaster.broadcast_raw("1");
        let report = broadcaster.broadcast_raw("2");

        assert_eq!(report.pruned, 1);
        assert_eq!(broadcaster.subscriber_count(), 0);

        // Already-queued events drain, then the stream ends
        assert!(slow.recv().await.unwrap().is_handshake());
        assert_eq!(&*slow.recv().await.unwrap().data, "1");
        assert!(slow.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_subscription_unsubscribes() {
        let broadcaster = Broadcaster::new();
        let sub = broadcaster.subscribe_channel(4);
        let id = sub.id();
        assert!(broadcaster.is_subscribed(id));

        drop(sub);

        assert!(!broadcaster.is_subscribed(id));
        assert!(!broadcaster.unsubscribe(id));
        assert_eq!(broadcaster.metrics().subscribers, 0);
    }

    #[tokio::test]
    async fn test_subscription_as_stream() {
        let broadcaster = Broadcaster::new();
        broadcaster.broadcast_raw("cached");
        let sub = broadcaster.subscribe_channel(4);

        let events: Vec<StreamEvent> = sub.take(2).collect().await;

        assert!(events[0].is_handshake());
        assert_eq!(&*events[1].data, "cached");
    }

    #[test]
    fn test_metrics_track_broadcasts() {
        let broadcaster = Broadcaster::new();
        let _a = broadcaster.subscribe_channel(8);
        let _b = broadcaster.subscribe_channel(8);

        broadcaster.broadcast_raw("x");
        broadcaster.broadcast_raw("y");

        let metrics = broadcaster.metrics();
        assert_eq!(metrics.subscribers, 2);
        assert_eq!(metrics.broadcast_count, 2);
        assert_eq!(metrics.delivery_count, 4);
        assert_eq!(metrics.pruned_count, 0);
        assert_eq!(broadcaster.last_payload().as_deref(), Some("y"));
    }

    /// Records every message payload it receives
    struct RecordingSubscriber {
        id: SubscriberId,
        payloads: Mutex<Vec<Arc<str>>>,
    }

    impl Subscriber for RecordingSubscriber {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn deliver(&self, event: StreamEvent) -> Result<(), ContractError> {
            if !event.is_handshake() {
                self.payloads.lock().push(event.data);
            }
            Ok(())
        }
    }

    #[test]
    fn test_concurrent_subscribe_never_sees_payload_twice() {
        let broadcaster = Broadcaster::new();
        let joined: Mutex<Vec<Arc<RecordingSubscriber>>> = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for n in 0..500 {
                    broadcaster.broadcast_raw(n.to_string());
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    let subscriber = Arc::new(RecordingSubscriber {
                        id: broadcaster.next_subscriber_id(),
                        payloads: Mutex::new(Vec::new()),
                    });
                    broadcaster.subscribe(subscriber.clone());
                    joined.lock().push(subscriber);
                }
            });
        });

        for subscriber in joined.lock().iter() {
            let payloads = subscriber.payloads.lock();
            let mut seen = std::collections::HashSet::new();
            for payload in payloads.iter() {
                assert!(
                    seen.insert(payload.clone()),
                    "subscriber {} received {} twice",
                    subscriber.id,
                    payload
                );
            }
        }
    }
}
