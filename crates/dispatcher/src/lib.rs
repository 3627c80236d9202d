//! # Dispatcher
//!
//! Live fan-out of aggregate snapshots.
//!
//! Keeps the set of connected subscribers and pushes every payload to each
//! of them without blocking. A subscriber whose delivery fails is removed,
//! so one slow client never holds up the rest.

pub mod broadcaster;
pub mod error;
pub mod event_id;
pub mod handle;
pub mod metrics;
pub mod subscribers;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use contracts::{StreamEvent, Subscriber, SubscriberId};
pub use error::DispatcherError;
pub use event_id::EventIdGenerator;
pub use handle::{ChannelSubscriber, Subscription};
pub use metrics::{BroadcastMetrics, MetricsSnapshot};
pub use subscribers::LogSubscriber;
