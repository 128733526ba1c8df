//! Sources of the system "prefers dark" signal.
//!
//! - [`SystemSignal`]: read the current value and subscribe to changes
//! - [`ManualSignal`]: a source the host drives by hand
//! - [`OsSignal`]: the operating system's dark-mode setting
//! - [`Subscription`]: handle that unsubscribes when dropped

mod listeners;
mod manual;
mod os;

pub use listeners::{SignalCallback, Subscription};
pub use manual::ManualSignal;
pub use os::{OsSignal, SignalDetector, DEFAULT_POLL_INTERVAL};

pub(crate) use listeners::Listeners;

/// A boolean "system prefers dark" signal that may change at any time.
pub trait SystemSignal: Send + Sync {
    /// Returns the current value.
    fn read(&self) -> bool;

    /// Registers `callback` to run with each new value.
    ///
    /// The callback stays registered until the returned handle is dropped.
    fn on_change(&self, callback: SignalCallback) -> Subscription;
}

impl<S: SystemSignal + ?Sized> SystemSignal for std::sync::Arc<S> {
    fn read(&self) -> bool {
        (**self).read()
    }

    fn on_change(&self, callback: SignalCallback) -> Subscription {
        (**self).on_change(callback)
    }
}
