use std::sync::atomic::{AtomicBool, Ordering};

use super::{Listeners, SignalCallback, Subscription, SystemSignal};

/// A system signal driven by the host.
///
/// Hosts that receive dark-mode notifications through their own event loop
/// forward them with [`set`](Self::set). Also the natural fixture for tests.
///
/// # Example
///
/// ```rust
/// use shade::{ManualSignal, SystemSignal};
///
/// let signal = ManualSignal::new(false);
/// let _sub = signal.on_change(Box::new(|dark| println!("dark: {dark}")));
/// signal.set(true);
/// assert!(signal.read());
/// ```
#[derive(Default)]
pub struct ManualSignal {
    prefers_dark: AtomicBool,
    listeners: Listeners,
}

impl ManualSignal {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: AtomicBool::new(prefers_dark),
            listeners: Listeners::new(),
        }
    }

    /// Updates the value, notifying subscribers if it changed.
    pub fn set(&self, prefers_dark: bool) {
        let previous = self.prefers_dark.swap(prefers_dark, Ordering::SeqCst);
        if previous != prefers_dark {
            self.listeners.notify(prefers_dark);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl SystemSignal for ManualSignal {
    fn read(&self) -> bool {
        self.prefers_dark.load(Ordering::SeqCst)
    }

    fn on_change(&self, callback: SignalCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }
}

impl std::fmt::Debug for ManualSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSignal")
            .field("prefers_dark", &self.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
