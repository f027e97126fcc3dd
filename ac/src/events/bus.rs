//! Activity Bus - broadcast of request activity events
//!
//! Components emit, consumers (the JSONL logger, tests) subscribe. Emission is
//! fire-and-forget; with no subscribers the event is dropped.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use super::types::ApiEvent;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Central bus for request activity
pub struct ActivityBus {
    tx: broadcast::Sender<ApiEvent>,
}

impl ActivityBus {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "ActivityBus::new: creating activity bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// If the channel is full, the oldest events are dropped for slow receivers.
    pub fn emit(&self, event: ApiEvent) {
        debug!(
            event_type = event.event_type(),
            request_id = event.request_id(),
            "ActivityBus::emit"
        );
        // Ignore send errors (no subscribers is OK)
        let _ = self.tx.send(event);
    }

    /// Receive all events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ApiEvent> {
        debug!("ActivityBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ActivityBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Create an activity bus wrapped in an Arc for shared ownership
pub fn create_activity_bus() -> Arc<ActivityBus> {
    Arc::new(ActivityBus::with_default_capacity())
}
