use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Callback invoked with the new signal value.
pub type SignalCallback = Box<dyn Fn(bool) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, SharedCallback)>,
}

/// Subscriber list shared between a signal source and its subscriptions.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    registry: Arc<Mutex<Registry>>,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self, callback: SignalCallback) -> Subscription {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::from(callback)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Runs every registered callback with `value`.
    ///
    /// Callbacks run after the list lock is released, so they may
    /// subscribe or drop subscriptions themselves.
    pub(crate) fn notify(&self, value: bool) {
        let callbacks: Vec<SharedCallback> = self
            .lock()
            .entries
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a registered signal callback.
///
/// Dropping it removes the callback. The handle does not keep the signal
/// source alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl Subscription {
    /// Removes the callback now rather than at drop.
    pub fn cancel(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.entries.retain(|(id, _)| *id != self.id);
        }
    }
}
