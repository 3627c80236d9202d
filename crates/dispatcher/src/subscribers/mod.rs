//! Subscriber implementations beyond the channel-backed one

mod log;

pub use self::log::LogSubscriber;
