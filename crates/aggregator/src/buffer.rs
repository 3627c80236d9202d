//! Per-role time-windowed buffer.
//!
//! Contents are kept sorted ascending by timestamp. Expiry happens only on
//! write: everything before "now" is dropped, except that the latest item is
//! always retained as the last known position.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use contracts::Timestamped;
use parking_lot::RwLock;
use tracing::trace;

use crate::clock::{Clock, SystemClock};

/// Ordered, self-expiring buffer of timestamped items
///
/// Readers (`snapshot`, `peek`, `len`) share the lock; writers (`add`,
/// `add_all`, `replace_all`, `purge`) hold it exclusively for the whole
/// mutate-sort-purge sequence, so a reader never sees a half-applied write.
pub struct TimeWindowBuffer<T> {
    items: RwLock<Vec<T>>,
    clock: Arc<dyn Clock>,
}

impl<T> fmt::Debug for TimeWindowBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeWindowBuffer")
            .field("len", &self.items.read().len())
            .finish()
    }
}

impl<T: Timestamped + Clone> Default for TimeWindowBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Timestamped + Clone> TimeWindowBuffer<T> {
    /// Create an empty buffer driven by the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty buffer driven by the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Insert one item, re-sort, then expire relative to now
    pub fn add(&self, item: T) {
        let now = self.clock.now();
        let mut items = self.items.write();
        items.push(item);
        sort_and_expire(&mut items, now);
    }

    /// Insert many items under a single lock acquisition
    ///
    /// Equivalent to repeated [`add`](Self::add). Empty input is a no-op and
    /// does not purge. Returns the number of items inserted.
    pub fn add_all<I>(&self, new_items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let new_items: Vec<T> = new_items.into_iter().collect();
        if new_items.is_empty() {
            return 0;
        }
        let inserted = new_items.len();
        let now = self.clock.now();
        let mut items = self.items.write();
        items.extend(new_items);
        sort_and_expire(&mut items, now);
        inserted
    }

    /// Discard all contents and install `new_items` in their place
    ///
    /// The new contents are sorted and expired like any other write.
    pub fn replace_all(&self, new_items: Vec<T>) {
        let now = self.clock.now();
        let mut items = self.items.write();
        *items = new_items;
        sort_and_expire(&mut items, now);
    }

    /// Expire relative to `now`
    ///
    /// Returns the number of items dropped.
    pub fn purge(&self, now: DateTime<Utc>) -> usize {
        let mut items = self.items.write();
        expire(&mut items, now)
    }

    /// Immutable point-in-time copy, ascending by timestamp
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Earliest item
    pub fn peek(&self) -> Option<T> {
        self.items.read().first().cloned()
    }

    /// Current item count
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

fn sort_and_expire<T: Timestamped>(items: &mut Vec<T>, now: DateTime<Utc>) {
    items.sort_by_key(Timestamped::timestamp);
    expire(items, now);
}

/// Drop the prefix older than `now`, never the last item
///
/// `items` must already be sorted ascending.
fn expire<T: Timestamped>(items: &mut Vec<T>, now: DateTime<Utc>) -> usize {
    let Some(last) = items.last() else {
        return 0;
    };

    let dropped = if last.timestamp() < now {
        // Everything is stale; keep only the last known point
        items.len() - 1
    } else {
        items.partition_point(|item| item.timestamp() < now)
    };

    if dropped > 0 {
        items.drain(..dropped);
        trace!(dropped, remaining = items.len(), "expired buffer prefix");
    }
    dropped
}
