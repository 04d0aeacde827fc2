//! Ordered observer registry.
//!
//! Callbacks are invoked in subscription order on the task that dispatches
//! the event. A callback must not block; anything slow should be handed off
//! to a channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Handle returned by [`ObserverRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Registry of callbacks for events of type `T`
pub struct ObserverRegistry<T> {
    next_id: AtomicU64,
    observers: RwLock<Vec<(ObserverId, Callback<T>)>>,
}

impl<T> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register a callback, appended after existing ones
    pub fn subscribe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback; returns `false` if it was not registered
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Invoke every callback with `event`
    ///
    /// The list is snapshotted first so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    pub fn notify(&self, event: &T) {
        let snapshot: Vec<Callback<T>> = self
            .observers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
