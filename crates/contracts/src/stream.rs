//! Push-stream contract between the fan-out and its subscribers

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Event name of the connection handshake
pub const HANDSHAKE_EVENT: &str = "Hello";

/// Handshake payload
pub const HANDSHAKE_DATA: &str = "connection successful!";

/// Event name of every data push
pub const MESSAGE_EVENT: &str = "message";

/// Subscriber identifier, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One pushed event
///
/// `data` is shared between all subscribers of the same broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub name: &'static str,
    pub id: String,
    pub data: Arc<str>,
}

impl StreamEvent {
    pub fn handshake(id: String) -> Self {
        Self {
            name: HANDSHAKE_EVENT,
            id,
            data: Arc::from(HANDSHAKE_DATA),
        }
    }

    pub fn message(id: String, data: Arc<str>) -> Self {
        Self {
            name: MESSAGE_EVENT,
            id,
            data,
        }
    }

    pub fn is_handshake(&self) -> bool {
        self.name == HANDSHAKE_EVENT
    }
}

/// Live subscriber channel
///
/// `deliver` must not block: a subscriber that cannot accept the event right
/// away reports a delivery failure and is dropped by the fan-out.
pub trait Subscriber: Send + Sync {
    /// Identifier used for unsubscription
    fn id(&self) -> SubscriberId;

    /// Attempt to deliver one event
    ///
    /// # Errors
    /// `SubscriberClosed` / `SubscriberLagging` when the event cannot be delivered
    fn deliver(&self, event: StreamEvent) -> Result<(), ContractError>;
}
