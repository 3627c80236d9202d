//! Broadcast metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Fan-out counters
///
/// Every update is mirrored to the process-wide recorder.
#[derive(Debug, Default)]
pub struct BroadcastMetrics {
    /// Current subscriber count
    subscribers: AtomicUsize,
    /// Total broadcasts
    broadcast_count: AtomicU64,
    /// Total successful deliveries (handshakes excluded)
    delivery_count: AtomicU64,
    /// Total subscribers removed after a failed delivery
    pruned_count: AtomicU64,
    /// Handshakes that could not be delivered
    handshake_failures: AtomicU64,
}

impl BroadcastMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribers(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }

    pub fn set_subscribers(&self, count: usize) {
        self.subscribers.store(count, Ordering::Relaxed);
        observability::record_subscriber_count(count);
    }

    pub fn broadcast_count(&self) -> u64 {
        self.broadcast_count.load(Ordering::Relaxed)
    }

    pub fn delivery_count(&self) -> u64 {
        self.delivery_count.load(Ordering::Relaxed)
    }

    pub fn pruned_count(&self) -> u64 {
        self.pruned_count.load(Ordering::Relaxed)
    }

    /// Record one broadcast outcome
    pub fn record_broadcast(&self, delivered: usize, pruned: usize) {
        self.broadcast_count.fetch_add(1, Ordering::Relaxed);
        self.delivery_count
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.pruned_count.fetch_add(pruned as u64, Ordering::Relaxed);
        observability::record_broadcast(delivered, pruned);
    }

    /// Record a delivery outside a broadcast (cached payload to a new subscriber)
    pub fn record_replay(&self, delivered: bool) {
        if delivered {
            self.delivery_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.pruned_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_handshake_failures(&self) {
        self.handshake_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn handshake_failures(&self) -> u64 {
        self.handshake_failures.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            subscribers: self.subscribers(),
            broadcast_count: self.broadcast_count(),
            delivery_count: self.delivery_count(),
            pruned_count: self.pruned_count(),
            handshake_failures: self.handshake_failures(),
        }
    }
}

/// Snapshot of fan-out metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub subscribers: usize,
    pub broadcast_count: u64,
    pub delivery_count: u64,
    pub pruned_count: u64,
    pub handshake_failures: u64,
}
