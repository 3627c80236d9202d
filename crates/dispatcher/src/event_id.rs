//! Event identifiers for pushed events

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Wall-clock based event id source
///
/// Ids are epoch milliseconds, bumped past the previous id when the clock
/// has not advanced (or stepped back), so they strictly increase.
#[derive(Debug, Default)]
pub struct EventIdGenerator {
    last: AtomicI64,
}

impl EventIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id as a number
    pub fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }

    /// Next id rendered for the wire
    pub fn next_id(&self) -> String {
        self.next_millis().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ids_strictly_increase() {
        let ids = EventIdGenerator::new();
        let mut prev = ids.next_millis();
        for _ in 0..1_000 {
            let next = ids.next_millis();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_ids_track_wall_clock() {
        let before = Utc::now().timestamp_millis();
        let id: i64 = EventIdGenerator::new().next_id().parse().unwrap();
        assert!(id >= before);
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let ids = Arc::new(EventIdGenerator::new());
        let mut all: Vec<i64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| (0..250).map(|_| ids.next_millis()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 1_000);
    }
}
