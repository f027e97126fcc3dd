//! Loading State Aggregator - in-flight counter and derived busy flag
//!
//! A plain boolean is wrong once calls overlap: the first call to settle
//! would clear it while a slower call is still pending. The counter only
//! reaches zero once every started call has ended, whatever the order.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use super::bus::{LoadingSignal, LoadingSubscriber};

type BusyCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Counts outstanding work and reports busy/idle transitions
pub struct LoadingState {
    in_flight: Mutex<u64>,
    callbacks: Mutex<Vec<BusyCallback>>,
    /// Last value handed to the callbacks; held while they run
    delivered: Mutex<bool>,
    busy_tx: watch::Sender<bool>,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingState {
    pub fn new() -> Self {
        let (busy_tx, _) = watch::channel(false);
        Self {
            in_flight: Mutex::new(0),
            callbacks: Mutex::new(Vec::new()),
            delivered: Mutex::new(false),
            busy_tx,
        }
    }

    /// Number of calls started but not yet settled
    pub fn in_flight(&self) -> u64 {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Register a callback fired with the new value whenever busy flips
    ///
    /// Deliveries are serialized and always carry the current value, so the
    /// last call a callback sees matches `is_busy()`. Callbacks may read the
    /// state but must not send loading signals themselves.
    pub fn on_busy_change(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// Receiver tracking the latest busy value, for async consumers
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.busy_tx.subscribe()
    }

    fn apply(&self, signal: LoadingSignal) {
        let flipped = {
            let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let was_busy = *count > 0;
            match signal {
                LoadingSignal::Start => *count += 1,
                LoadingSignal::End if *count == 0 => {
                    debug!("LoadingState: unmatched end signal ignored");
                }
                LoadingSignal::End => *count -= 1,
            }
            let busy = *count > 0;
            debug!(?signal, in_flight = *count, "LoadingState::apply");
            if busy != was_busy {
                // Updated under the counter lock so the watch value never lags
                self.busy_tx.send_replace(busy);
            }
            busy != was_busy
        };

        if flipped {
            self.deliver();
        }
    }

    fn deliver(&self) {
        let mut delivered = self.delivered.lock().unwrap_or_else(PoisonError::into_inner);
        // A racing flip may already have been undone; only the current value counts
        let busy = self.is_busy();
        if *delivered == busy {
            debug!(busy, "LoadingState::deliver: stale flip dropped");
            return;
        }
        *delivered = busy;

        let callbacks: Vec<BusyCallback> = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner).clone();
        for callback in callbacks {
            callback(busy);
        }
    }
}

impl LoadingSubscriber for LoadingState {
    fn on_signal(&self, signal: LoadingSignal) {
        self.apply(signal);
    }
}
