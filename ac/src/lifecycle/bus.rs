//! Loading Signal Bus - in-process start/end signals for outstanding work
//!
//! Unlike the activity bus, delivery here is synchronous: `signal_start` and
//! `signal_end` return only after every subscriber registered so far has seen
//! the signal, in registration order. There is no queue and no replay.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// A unit of work started or settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingSignal {
    Start,
    End,
}

/// Receiver of loading signals
pub trait LoadingSubscriber: Send + Sync {
    fn on_signal(&self, signal: LoadingSignal);
}

impl<F> LoadingSubscriber for F
where
    F: Fn(LoadingSignal) + Send + Sync,
{
    fn on_signal(&self, signal: LoadingSignal) {
        self(signal)
    }
}

/// Publish/subscribe channel for loading signals
#[derive(Default)]
pub struct LoadingBus {
    subscribers: RwLock<Vec<Arc<dyn LoadingSubscriber>>>,
}

impl LoadingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it receives every signal sent from now on
    pub fn subscribe(&self, subscriber: Arc<dyn LoadingSubscriber>) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.push(subscriber);
        debug!(count = subscribers.len(), "LoadingBus::subscribe: new subscriber");
    }

    /// Announce that a unit of work started
    pub fn signal_start(&self) {
        self.deliver(LoadingSignal::Start);
    }

    /// Announce that a unit of work settled
    pub fn signal_end(&self) {
        self.deliver(LoadingSignal::End);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn deliver(&self, signal: LoadingSignal) {
        // Snapshot so subscribers can subscribe others without deadlocking
        let subscribers: Vec<Arc<dyn LoadingSubscriber>> =
            self.subscribers.read().unwrap_or_else(PoisonError::into_inner).clone();
        debug!(?signal, subscribers = subscribers.len(), "LoadingBus::deliver");
        for subscriber in subscribers {
            subscriber.on_signal(signal);
        }
    }
}
