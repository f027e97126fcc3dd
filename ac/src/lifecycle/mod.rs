//! Request lifecycle - loading signals and the busy state derived from them
//!
//! # Architecture
//!
//! ```text
//!  ApiClient::send ──begin()──► LoadingBus ──Start──► LoadingState (count += 1)
//!        │                          │                      │
//!        └──settle()/drop──────► LoadingBus ──End────► LoadingState (count = max(0, count - 1))
//!                                                          │
//!                                           on_busy_change / watch() ──► GlobalLoader
//! ```
//!
//! A [`RequestLifecycle`] is built once at startup and shared as an `Arc`;
//! nothing here is a process-wide singleton.

mod bus;
mod state;

pub use bus::{LoadingBus, LoadingSignal, LoadingSubscriber};
pub use state::LoadingState;

use std::sync::Arc;

use tracing::debug;

/// Loading bus plus the aggregator subscribed to it
pub struct RequestLifecycle {
    bus: Arc<LoadingBus>,
    state: Arc<LoadingState>,
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLifecycle {
    /// Create a bus and subscribe a fresh aggregator to it
    pub fn new() -> Self {
        let bus = Arc::new(LoadingBus::new());
        let state = Arc::new(LoadingState::new());
        bus.subscribe(state.clone());
        debug!("RequestLifecycle::new: aggregator subscribed");
        Self { bus, state }
    }

    pub fn bus(&self) -> &Arc<LoadingBus> {
        &self.bus
    }

    pub fn state(&self) -> &Arc<LoadingState> {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Signal start and return a guard that signals end exactly once
    pub fn begin(&self) -> InFlight {
        self.bus.signal_start();
        InFlight {
            bus: self.bus.clone(),
            settled: false,
        }
    }
}

/// Outstanding unit of work
///
/// Call [`InFlight::settle`] when the work completes. If the guard is dropped
/// unsettled (early return, cancelled future, panic) the end signal is sent
/// from `Drop`, so the counter stays balanced either way.
#[must_use = "dropping the guard immediately ends the loading cycle"]
pub struct InFlight {
    bus: Arc<LoadingBus>,
    settled: bool,
}

impl InFlight {
    pub fn settle(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.settled {
            self.settled = true;
            self.bus.signal_end();
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.finish();
    }
}
