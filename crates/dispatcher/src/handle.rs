//! Channel-backed subscribers

use std::pin::Pin;
use std::task::{Context, Poll};

use contracts::{ContractError, StreamEvent, Subscriber, SubscriberId};
use futures_util::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use crate::broadcaster::Broadcaster;

/// Sending half registered with the fan-out
#[derive(Debug)]
pub struct ChannelSubscriber {
    id: SubscriberId,
    tx: mpsc::Sender<StreamEvent>,
    capacity: usize,
}

impl ChannelSubscriber {
    /// Create a bounded subscriber and its receiving half
    pub fn new(id: SubscriberId, capacity: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { id, tx, capacity }, rx)
    }
}

impl Subscriber for ChannelSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn deliver(&self, event: StreamEvent) -> Result<(), ContractError> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ContractError::SubscriberLagging {
                subscriber: self.id,
                capacity: self.capacity,
            }),
            Err(TrySendError::Closed(_)) => {
                Err(ContractError::SubscriberClosed { subscriber: self.id })
            }
        }
    }
}

/// Receiving half handed to the transport
///
/// Yields the handshake, the cached payload if any, then every broadcast.
/// Dropping it removes the subscriber from the fan-out.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<StreamEvent>,
    broadcaster: Broadcaster,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        rx: mpsc::Receiver<StreamEvent>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            id,
            rx,
            broadcaster,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event; `None` once the subscriber has been pruned
    /// and the queue is drained
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }

    /// Next queued event without waiting
    pub fn try_recv(&mut self) -> Option<StreamEvent> {
        self.rx.try_recv().ok()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Stream for Subscription {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.broadcaster.unsubscribe(self.id) {
            debug!(subscriber = %self.id, "subscription dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_deliver_reports_full_queue() {
        let (subscriber, _rx) = ChannelSubscriber::new(SubscriberId(1), 1);

        subscriber
            .deliver(StreamEvent::handshake("1".to_string()))
            .unwrap();
        let err = subscriber
            .deliver(StreamEvent::message("2".to_string(), Arc::from("{}")))
            .unwrap_err();

        assert!(matches!(
            err,
            ContractError::SubscriberLagging { capacity: 1, .. }
        ));
        assert!(err.is_delivery_failure());
    }

    #[test]
    fn test_deliver_reports_closed_channel() {
        let (subscriber, rx) = ChannelSubscriber::new(SubscriberId(7), 4);
        drop(rx);

        let err = subscriber
            .deliver(StreamEvent::handshake("1".to_string()))
            .unwrap_err();

        assert!(matches!(
            err,
            ContractError::SubscriberClosed {
                subscriber: SubscriberId(7)
            }
        ));
    }
}
