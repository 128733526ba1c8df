//! The operating system's dark-mode setting as a [`SystemSignal`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};

use super::{Listeners, SignalCallback, Subscription, SystemSignal};

/// Function reporting whether the OS currently prefers dark.
pub type SignalDetector = fn() -> bool;

/// How often [`OsSignal::watch`] polls when no interval is given.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

struct Shared {
    detector: SignalDetector,
    last: AtomicBool,
    listeners: Listeners,
}

impl Shared {
    fn poll(&self) -> bool {
        let current = (self.detector)();
        let previous = self.last.swap(current, Ordering::SeqCst);
        if previous != current {
            tracing::debug!(prefers_dark = current, "system appearance changed");
            self.listeners.notify(current);
        }
        current
    }
}

/// Reads the OS light/dark setting.
///
/// The OS offers no change notification we can rely on across platforms,
/// so changes are found by polling: either call [`poll`](Self::poll) from
/// the host's own loop, or start a background poller with
/// [`watch`](Self::watch). The poller stops when the signal is dropped.
pub struct OsSignal {
    shared: Arc<Shared>,
    poller: Option<Poller>,
}

struct Poller {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl OsSignal {
    /// Creates a signal backed by the OS theme detector.
    pub fn new() -> Self {
        Self::with_detector(os_theme_detector)
    }

    /// Creates a signal backed by a custom detector.
    ///
    /// This is useful for testing or when you want to force a specific mode.
    pub fn with_detector(detector: SignalDetector) -> Self {
        Self {
            shared: Arc::new(Shared {
                detector,
                last: AtomicBool::new(detector()),
                listeners: Listeners::new(),
            }),
            poller: None,
        }
    }

    /// Starts polling the detector every `interval` on a background thread.
    ///
    /// Calling it again replaces the previous poller.
    pub fn watch(mut self, interval: Duration) -> Self {
        self.stop_poller();

        let (stop, stopped) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("shade-os-signal".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        shared.poll();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        match handle {
            Ok(handle) => self.poller = Some(Poller { stop, handle }),
            Err(err) => {
                tracing::warn!(error = %err, "could not start appearance poller, changes will not be detected");
            }
        }
        self
    }

    /// Re-reads the detector, notifying subscribers if the value changed.
    pub fn poll(&self) -> bool {
        self.shared.poll()
    }

    pub fn is_watching(&self) -> bool {
        self.poller.is_some()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.shared.listeners.len()
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            let _ = poller.stop.send(());
            // Dropped from inside a notification: the poller exits on its
            // next wakeup, it cannot join itself.
            if poller.handle.thread().id() == thread::current().id() {
                return;
            }
            if poller.handle.join().is_err() {
                tracing::warn!("appearance poller panicked");
            }
        }
    }
}

impl Default for OsSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OsSignal {
    fn drop(&mut self) {
        self.stop_poller();
    }
}

impl SystemSignal for OsSignal {
    fn read(&self) -> bool {
        (self.shared.detector)()
    }

    fn on_change(&self, callback: SignalCallback) -> Subscription {
        self.shared.listeners.subscribe(callback)
    }
}

impl std::fmt::Debug for OsSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsSignal")
            .field("watching", &self.is_watching())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn os_theme_detector() -> bool {
    match detect_os_theme() {
        OsThemeMode::Dark => true,
        OsThemeMode::Light => false,
    }
}
