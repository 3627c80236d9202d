//! LogSubscriber - logs event summaries via tracing

use contracts::{ContractError, StreamEvent, Subscriber, SubscriberId};
use tracing::info;

/// Subscriber that logs every pushed event for debugging
#[derive(Debug)]
pub struct LogSubscriber {
    id: SubscriberId,
    name: String,
}

impl LogSubscriber {
    pub fn new(id: SubscriberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Subscriber for LogSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn deliver(&self, event: StreamEvent) -> Result<(), ContractError> {
        info!(
            subscriber = %self.name,
            event = event.name,
            event_id = %event.id,
            bytes = event.data.len(),
            "stream event"
        );
        Ok(())
    }
}
