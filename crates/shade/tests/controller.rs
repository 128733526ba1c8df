//! End-to-end behavior of the preference controller against real stores
//! and signal sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use shade::{
    resolve, Appearance, AppearanceSink, FileStore, ManualSignal, MemoryStore, OsSignal,
    Preference, PreferenceController, PreferenceStore, RecordingSink, StoreError, SystemSignal,
    DEFAULT_STORAGE_KEY,
};
use tempfile::TempDir;

fn build(
    store: impl PreferenceStore + 'static,
    signal: &Arc<ManualSignal>,
    sink: &RecordingSink,
) -> PreferenceController {
    PreferenceController::builder()
        .store(store)
        .signal(Arc::clone(signal))
        .sink(sink.clone())
        .build()
}

#[test]
fn test_set_dark_twice_is_idempotent() {
    let store = MemoryStore::new();
    let signal = Arc::new(ManualSignal::new(false));
    let sink = RecordingSink::new();
    let mut controller = build(store.clone(), &signal, &sink);
    controller.initialize();

    assert_eq!(controller.set_preference(Preference::Dark), Appearance::Dark);
    assert_eq!(controller.set_preference(Preference::Dark), Appearance::Dark);
    assert_eq!(store.get(DEFAULT_STORAGE_KEY).as_deref(), Some("dark"));
    assert_eq!(sink.current(), Some(Appearance::Dark));
}

#[test]
fn test_toggle_from_light_regardless_of_mode() {
    for start in [Preference::Light, Preference::System] {
        let signal = Arc::new(ManualSignal::new(false));
        let sink = RecordingSink::new();
        let mut controller = build(MemoryStore::new(), &signal, &sink);
        controller.initialize();
        controller.set_preference(start);
        assert_eq!(controller.appearance(), Appearance::Light);

        assert_eq!(controller.toggle(), Appearance::Dark);
        assert_eq!(controller.preference(), Preference::Dark);
    }
}

#[test]
fn test_preference_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.json");
    let signal = Arc::new(ManualSignal::new(false));
    let sink = RecordingSink::new();

    let mut first = build(FileStore::new(&path), &signal, &sink);
    first.initialize();
    first.set_preference(Preference::Dark);
    drop(first);

    let mut second = build(FileStore::new(&path), &signal, &sink);
    assert_eq!(second.initialize(), (Preference::Dark, Appearance::Dark));
}

#[test]
fn test_system_change_follows_only_in_system_mode() {
    let signal = Arc::new(ManualSignal::new(false));
    let sink = RecordingSink::new();
    let mut controller = build(MemoryStore::new(), &signal, &sink);

    assert_eq!(controller.initialize(), (Preference::System, Appearance::Light));
    controller.on_system_signal_changed(true);
    assert_eq!(controller.appearance(), Appearance::Dark);

    controller.set_preference(Preference::Dark);
    signal.set(false);
    controller.on_system_signal_changed(false);
    assert_eq!(controller.appearance(), Appearance::Dark);
    assert_eq!(controller.preference(), Preference::Dark);
}

#[test]
fn test_subscription_delivers_signal_changes() {
    let signal = Arc::new(ManualSignal::new(false));
    let sink = RecordingSink::new();
    let mut controller = build(MemoryStore::new(), &signal, &sink);
    controller.initialize();

    signal.set(true);
    signal.set(false);

    assert_eq!(
        sink.history(),
        vec![Appearance::Light, Appearance::Dark, Appearance::Light]
    );
}

#[test]
fn test_corrupt_store_falls_back_to_system() {
    let store = MemoryStore::new().with_entry(DEFAULT_STORAGE_KEY, "midnight-blue");
    let signal = Arc::new(ManualSignal::new(true));
    let sink = RecordingSink::new();
    let mut controller = build(store, &signal, &sink);

    assert_eq!(controller.initialize(), (Preference::System, Appearance::Dark));
    assert!(controller.is_persistent());
}

#[test]
fn test_corrupt_file_falls_back_then_recovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, "[1, 2").unwrap();
    let signal = Arc::new(ManualSignal::new(false));
    let sink = RecordingSink::new();

    let mut controller = build(FileStore::new(&path), &signal, &sink);
    assert_eq!(controller.initialize(), (Preference::System, Appearance::Light));

    controller.set_preference(Preference::Light);
    assert_eq!(
        FileStore::new(&path).load(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
        Some("light")
    );
}

/// Reads fine, refuses every write.
struct ReadOnlyStore(MemoryStore);

impl PreferenceStore for ReadOnlyStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.load(key)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            path: "/read-only/preferences.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn test_write_failure_keeps_state_in_memory() {
    let store = ReadOnlyStore(MemoryStore::new().with_entry(DEFAULT_STORAGE_KEY, "light"));
    let signal = Arc::new(ManualSignal::new(false));
    let sink = RecordingSink::new();
    let mut controller = build(store, &signal, &sink);
    assert_eq!(controller.initialize(), (Preference::Light, Appearance::Light));
    assert!(controller.is_persistent());

    assert_eq!(controller.set_preference(Preference::Dark), Appearance::Dark);
    assert!(!controller.is_persistent());
    assert_eq!(controller.preference(), Preference::Dark);
    assert_eq!(controller.toggle(), Appearance::Light);
    assert_eq!(sink.current(), Some(Appearance::Light));
}

#[test]
fn test_unreadable_file_store_degrades_to_memory() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let signal = Arc::new(ManualSignal::new(true));
    let sink = RecordingSink::new();

    let mut controller = build(FileStore::new(blocker.join("preferences.json")), &signal, &sink);
    assert_eq!(controller.initialize(), (Preference::System, Appearance::Dark));
    assert!(!controller.is_persistent());
    assert_eq!(controller.set_preference(Preference::Light), Appearance::Light);
}

fn assert_consistent(controller: &PreferenceController) {
    let snapshot = controller.snapshot();
    assert_eq!(
        snapshot.appearance,
        resolve(snapshot.preference, snapshot.system_prefers_dark),
        "{snapshot:?}"
    );
}

#[test]
fn test_concurrent_signal_and_user_updates_stay_consistent() {
    let signal = Arc::new(ManualSignal::new(false));
    let sink = RecordingSink::new();
    let mut controller = build(MemoryStore::new(), &signal, &sink);
    controller.initialize();
    let controller = Arc::new(controller);

    let flipper = {
        let signal = Arc::clone(&signal);
        let controller = Arc::clone(&controller);
        thread::spawn(move || {
            for i in 0..200 {
                signal.set(i % 2 == 0);
                assert_consistent(&controller);
            }
        })
    };
    let user = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || {
            for i in 0..200 {
                let preference = Preference::ALL[i % 3];
                controller.set_preference(preference);
                assert_consistent(&controller);
            }
        })
    };
    flipper.join().unwrap();
    user.join().unwrap();

    assert_consistent(&controller);
    assert_eq!(controller.system_prefers_dark(), signal.read());
    assert_eq!(sink.current(), Some(controller.appearance()));

    controller.set_preference(Preference::System);
    let expected = Appearance::from_signal(signal.read());
    assert_eq!(controller.appearance(), expected);
    assert_eq!(sink.current(), Some(expected));
}

static POLLED_DARK: AtomicBool = AtomicBool::new(false);

/// Blocks dark applies until released; records whether it was dropped
/// while unwinding.
struct GatedSink {
    entered: Arc<AtomicBool>,
    release: Arc<AtomicBool>,
    dropped_cleanly: Arc<Mutex<Option<bool>>>,
}

impl AppearanceSink for GatedSink {
    fn apply(&self, appearance: Appearance) {
        if appearance.is_dark() {
            self.entered.store(true, Ordering::SeqCst);
            while !self.release.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(2));
            }
        }
    }
}

impl Drop for GatedSink {
    fn drop(&mut self) {
        *self.dropped_cleanly.lock().unwrap() = Some(!thread::panicking());
    }
}

fn wait_for(deadline: Duration, done: impl Fn() -> bool) -> bool {
    let until = Instant::now() + deadline;
    while !done() && Instant::now() < until {
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

#[test]
fn test_drop_during_polled_delivery_releases_cleanly() {
    POLLED_DARK.store(false, Ordering::SeqCst);
    let entered = Arc::new(AtomicBool::new(false));
    let release = Arc::new(AtomicBool::new(false));
    let dropped_cleanly = Arc::new(Mutex::new(None));

    let mut controller = PreferenceController::builder()
        .signal(
            OsSignal::with_detector(|| POLLED_DARK.load(Ordering::SeqCst))
                .watch(Duration::from_millis(2)),
        )
        .sink(GatedSink {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
            dropped_cleanly: Arc::clone(&dropped_cleanly),
        })
        .build();
    assert_eq!(controller.initialize(), (Preference::System, Appearance::Light));

    POLLED_DARK.store(true, Ordering::SeqCst);
    assert!(wait_for(Duration::from_secs(5), || entered.load(Ordering::SeqCst)));

    drop(controller);
    release.store(true, Ordering::SeqCst);

    assert!(wait_for(Duration::from_secs(5), || dropped_cleanly
        .lock()
        .unwrap()
        .is_some()));
    assert_eq!(*dropped_cleanly.lock().unwrap(), Some(true));
}
