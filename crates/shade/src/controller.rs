//! The preference controller: owns the preference, resolves it, persists it,
//! and keeps the presentation layer in step with the system signal.
//!
//! # Lifecycle
//!
//! 1. Build with [`PreferenceController::builder`], injecting the store,
//!    signal source and sink.
//! 2. Call [`initialize`](PreferenceController::initialize) once. It loads
//!    the stored preference, applies the resolved appearance and subscribes
//!    to the signal.
//! 3. Drive it with [`set_preference`](PreferenceController::set_preference)
//!    and [`toggle`](PreferenceController::toggle). Signal changes arrive
//!    through the subscription, or through
//!    [`on_system_signal_changed`](PreferenceController::on_system_signal_changed)
//!    when the host delivers them itself.
//! 4. [`teardown`](PreferenceController::teardown), or drop the controller,
//!    to release the subscription.
//!
//! No operation returns an error. Storage failures are logged and the
//! controller carries on in memory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::appearance::{resolve, Appearance, Preference};
use crate::error::StoreError;
use crate::signal::{ManualSignal, Subscription, SystemSignal};
use crate::sink::AppearanceSink;
use crate::store::{MemoryStore, PreferenceStore, DEFAULT_STORAGE_KEY};

#[derive(Debug, Clone, Copy)]
struct State {
    preference: Preference,
    system_prefers_dark: bool,
    appearance: Appearance,
    persistent: bool,
}

struct Inner {
    key: String,
    store: Box<dyn PreferenceStore>,
    signal: Arc<dyn SystemSignal>,
    sink: Box<dyn AppearanceSink>,
    state: Mutex<State>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_preference(&self, state: &mut State) -> Preference {
        match self.store.load(&self.key) {
            Ok(Some(raw)) => match raw.parse::<Preference>() {
                Ok(preference) => preference,
                Err(err) => {
                    tracing::warn!(key = %self.key, error = %err, "ignoring unreadable stored preference");
                    Preference::default()
                }
            },
            Ok(None) => Preference::default(),
            Err(err @ StoreError::Corrupt(_)) => {
                tracing::warn!(key = %self.key, error = %err, "ignoring corrupt preference store");
                Preference::default()
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "preference store unreadable, keeping preferences in memory");
                state.persistent = false;
                Preference::default()
            }
        }
    }

    fn persist(&self, state: &mut State, preference: Preference) {
        if !state.persistent {
            tracing::debug!(%preference, "preference store disabled, not saving");
            return;
        }
        if let Err(err) = self.store.save(&self.key, preference.as_str()) {
            tracing::warn!(key = %self.key, error = %err, "could not save preference, keeping it in memory");
            state.persistent = false;
        }
    }

    fn set_preference(&self, preference: Preference) -> Appearance {
        let mut state = self.lock();
        self.set_locked(&mut state, preference)
    }

    fn set_locked(&self, state: &mut State, preference: Preference) -> Appearance {
        state.preference = preference;
        state.appearance = resolve(preference, state.system_prefers_dark);
        self.persist(state, preference);
        tracing::debug!(%preference, appearance = %state.appearance, "preference set");
        self.sink.apply(state.appearance);
        state.appearance
    }

    fn toggle(&self) -> Appearance {
        let mut state = self.lock();
        let target = Preference::from(state.appearance.opposite());
        self.set_locked(&mut state, target)
    }

    fn on_system_signal_changed(&self, prefers_dark: bool) {
        let mut state = self.lock();
        state.system_prefers_dark = prefers_dark;
        if state.preference.is_explicit() {
            tracing::debug!(
                prefers_dark,
                preference = %state.preference,
                "system signal changed, explicit preference kept"
            );
            return;
        }
        state.appearance = resolve(state.preference, prefers_dark);
        tracing::debug!(prefers_dark, appearance = %state.appearance, "following system appearance");
        self.sink.apply(state.appearance);
    }
}

/// A consistent view of the controller's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub preference: Preference,
    pub system_prefers_dark: bool,
    pub appearance: Appearance,
}

/// Owns the user's appearance preference and keeps its sink up to date.
///
/// Cheap to share behind an `Arc`; every method takes `&self` and all state
/// changes are serialized by one lock, so signal notifications from a
/// background thread cannot race user actions. The sink runs while that
/// lock is held.
///
/// # Example
///
/// ```rust
/// use shade::{Appearance, ManualSignal, MemoryStore, Preference, PreferenceController, RecordingSink};
/// use std::sync::Arc;
///
/// let signal = Arc::new(ManualSignal::new(false));
/// let sink = RecordingSink::new();
/// let mut controller = PreferenceController::builder()
///     .store(MemoryStore::new())
///     .signal(signal.clone())
///     .sink(sink.clone())
///     .build();
///
/// assert_eq!(controller.initialize(), (Preference::System, Appearance::Light));
///
/// signal.set(true);
/// assert_eq!(sink.current(), Some(Appearance::Dark));
///
/// assert_eq!(controller.toggle(), Appearance::Light);
/// assert_eq!(controller.preference(), Preference::Light);
/// ```
pub struct PreferenceController {
    inner: Arc<Inner>,
    subscription: Option<Subscription>,
}

impl PreferenceController {
    /// Creates a builder. Unset collaborators default to an in-memory
    /// store, a light manual signal and a sink that does nothing.
    pub fn builder() -> PreferenceControllerBuilder {
        PreferenceControllerBuilder::new()
    }

    /// Loads the stored preference, applies the resolved appearance and
    /// subscribes to system signal changes.
    ///
    /// A missing, corrupt or unreadable record yields [`Preference::System`].
    /// Calling it again reloads and resubscribes.
    pub fn initialize(&mut self) -> (Preference, Appearance) {
        self.subscription = None;

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let mut state = self.inner.lock();
        // Subscribe before reading the signal so a change landing in
        // between is delivered once the lock is released.
        let subscription = self.inner.signal.on_change(Box::new(move |prefers_dark| {
            if let Some(inner) = weak.upgrade() {
                inner.on_system_signal_changed(prefers_dark);
            }
        }));

        state.persistent = true;
        let preference = self.inner.load_preference(&mut state);
        state.preference = preference;
        state.system_prefers_dark = self.inner.signal.read();
        state.appearance = resolve(preference, state.system_prefers_dark);
        tracing::debug!(
            %preference,
            appearance = %state.appearance,
            persistent = state.persistent,
            "preference controller initialized"
        );
        self.inner.sink.apply(state.appearance);
        let appearance = state.appearance;
        drop(state);

        self.subscription = Some(subscription);
        (preference, appearance)
    }

    /// Stores `preference`, persists it and applies the resolved appearance.
    ///
    /// Resolves against the last signal value received, either read at
    /// [`initialize`](Self::initialize) or delivered since.
    pub fn set_preference(&self, preference: Preference) -> Appearance {
        self.inner.set_preference(preference)
    }

    /// Switches to the explicit opposite of the current appearance.
    ///
    /// From `System` this always lands on an explicit `Light` or `Dark`;
    /// toggling never returns to following the system.
    pub fn toggle(&self) -> Appearance {
        self.inner.toggle()
    }

    /// Handles a new system signal value.
    ///
    /// Re-resolves and applies only while the preference is `System`.
    pub fn on_system_signal_changed(&self, prefers_dark: bool) {
        self.inner.on_system_signal_changed(prefers_dark)
    }

    /// Releases the signal subscription. Later signal changes are ignored
    /// until [`initialize`](Self::initialize) is called again.
    pub fn teardown(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("preference controller torn down");
        }
    }

    pub fn preference(&self) -> Preference {
        self.inner.lock().preference
    }

    /// The resolved appearance last applied.
    pub fn appearance(&self) -> Appearance {
        self.inner.lock().appearance
    }

    /// The system signal value last seen.
    pub fn system_prefers_dark(&self) -> bool {
        self.inner.lock().system_prefers_dark
    }

    /// Preference, signal and appearance read under one lock.
    pub fn snapshot(&self) -> Snapshot {
        let state = *self.inner.lock();
        Snapshot {
            preference: state.preference,
            system_prefers_dark: state.system_prefers_dark,
            appearance: state.appearance,
        }
    }

    /// False once storage has failed this session.
    pub fn is_persistent(&self) -> bool {
        self.inner.lock().persistent
    }

    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

impl std::fmt::Debug for PreferenceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.inner.lock();
        f.debug_struct("PreferenceController")
            .field("key", &self.inner.key)
            .field("preference", &state.preference)
            .field("appearance", &state.appearance)
            .field("system_prefers_dark", &state.system_prefers_dark)
            .field("persistent", &state.persistent)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

/// Builder for [`PreferenceController`].
pub struct PreferenceControllerBuilder {
    key: String,
    store: Option<Box<dyn PreferenceStore>>,
    signal: Option<Arc<dyn SystemSignal>>,
    sink: Option<Box<dyn AppearanceSink>>,
}

impl PreferenceControllerBuilder {
    pub fn new() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            store: None,
            signal: None,
            sink: None,
        }
    }

    /// Key of the preference record. Defaults to [`DEFAULT_STORAGE_KEY`].
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Signal source. Pass an `Arc` to keep a handle for driving it.
    pub fn signal(mut self, signal: impl SystemSignal + 'static) -> Self {
        self.signal = Some(Arc::new(signal));
        self
    }

    pub fn sink(mut self, sink: impl AppearanceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Builds the controller. Nothing is loaded or applied until
    /// [`PreferenceController::initialize`].
    pub fn build(self) -> PreferenceController {
        let state = State {
            preference: Preference::default(),
            system_prefers_dark: false,
            appearance: Appearance::Light,
            persistent: true,
        };
        PreferenceController {
            inner: Arc::new(Inner {
                key: self.key,
                store: self
                    .store
                    .unwrap_or_else(|| Box::new(MemoryStore::new())),
                signal: self
                    .signal
                    .unwrap_or_else(|| Arc::new(ManualSignal::new(false))),
                sink: self.sink.unwrap_or_else(|| Box::new(|_: Appearance| {})),
                state: Mutex::new(state),
            }),
            subscription: None,
        }
    }
}

impl Default for PreferenceControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
