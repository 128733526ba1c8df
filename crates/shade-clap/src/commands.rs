//! Command execution.
//!
//! Each command builds a controller over the file store, runs one
//! operation and returns the text to print, so the handlers can be tested
//! without a terminal.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use shade::{
    AdaptivePalette, Appearance, AppearanceSink, FileStore, OsSignal, Preference,
    PreferenceController, SystemSignal,
};

use crate::cli::{Cli, Command};

/// Snapshot printed by `shade status`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub preference: Preference,
    pub appearance: &'static str,
    pub system_prefers_dark: bool,
    pub persistent: bool,
    pub store: String,
}

/// A controller wired to a file store, plus the palette it drives.
pub struct Session {
    controller: PreferenceController,
    palette: AdaptivePalette,
    store_path: PathBuf,
}

impl Session {
    pub fn open(
        store_path: Option<&Path>,
        key: &str,
        signal: impl SystemSignal + 'static,
    ) -> Result<Self> {
        Self::open_with_sink(store_path, key, signal, |_: Appearance| {})
    }

    /// Like [`open`](Self::open), also forwarding every applied appearance
    /// to `on_apply`.
    pub fn open_with_sink(
        store_path: Option<&Path>,
        key: &str,
        signal: impl SystemSignal + 'static,
        on_apply: impl AppearanceSink + 'static,
    ) -> Result<Self> {
        let store = match store_path {
            Some(path) => FileStore::new(path),
            None => FileStore::default_location()
                .context("could not locate a preference file, pass --store")?,
        };
        let store_path = store.path().to_path_buf();
        let palette = AdaptivePalette::default();
        let driven = palette.clone();

        let mut controller = PreferenceController::builder()
            .store(store)
            .storage_key(key)
            .signal(signal)
            .sink(move |appearance: Appearance| {
                driven.apply(appearance);
                on_apply.apply(appearance);
            })
            .build();
        controller.initialize();

        Ok(Self {
            controller,
            palette,
            store_path,
        })
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            preference: self.controller.preference(),
            appearance: self.controller.appearance().as_str(),
            system_prefers_dark: self.controller.system_prefers_dark(),
            persistent: self.controller.is_persistent(),
            store: self.store_path.display().to_string(),
        }
    }

    pub fn render_status(&self, json: bool) -> Result<String> {
        let report = self.status();
        if json {
            return serde_json::to_string_pretty(&report).context("could not encode status");
        }
        let system = if report.system_prefers_dark { "dark" } else { "light" };
        let mut lines = vec![
            format!(
                "{} {}",
                self.palette.paint("muted", "preference:"),
                self.palette.paint("title", report.preference.label())
            ),
            format!("{} {}", self.palette.paint("muted", "system:    "), system),
            format!(
                "{} {}",
                self.palette.paint("muted", "appearance:"),
                self.describe(self.controller.appearance())
            ),
        ];
        if !report.persistent {
            lines.push(
                self.palette
                    .paint("muted", "(preference store unavailable, changes are not saved)"),
            );
        }
        Ok(lines.join("\n"))
    }

    pub fn set(&self, preference: Preference) -> String {
        let appearance = self.controller.set_preference(preference);
        format!(
            "{} -> {}",
            self.palette.paint("title", preference.label()),
            self.describe(appearance)
        )
    }

    pub fn toggle(&self) -> String {
        let appearance = self.controller.toggle();
        self.describe(appearance)
    }

    /// Banner for `shade watch`, naming the preference and how to stop.
    pub fn watch_hint(&self) -> String {
        let preference = self.controller.preference();
        let note = if preference.is_explicit() {
            format!(
                "preference is {}, system changes will not alter it",
                preference.label()
            )
        } else {
            "following the system".to_string()
        };
        self.palette.paint(
            "muted",
            &format!("watching appearance ({note}); close stdin (Ctrl-D) to stop"),
        )
    }

    fn describe(&self, appearance: Appearance) -> String {
        self.palette.paint(appearance.as_str(), appearance.as_str())
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let store = cli.store.as_deref();
    match cli.command {
        Command::Status { json } => {
            let session = Session::open(store, &cli.key, OsSignal::new())?;
            println!("{}", session.render_status(json)?);
        }
        Command::Set { preference } => {
            let session = Session::open(store, &cli.key, OsSignal::new())?;
            println!("{}", session.set(preference));
        }
        Command::Toggle => {
            let session = Session::open(store, &cli.key, OsSignal::new())?;
            println!("{}", session.toggle());
        }
        Command::Watch { interval_ms } => watch(store, &cli.key, interval_ms)?,
    }
    Ok(())
}

fn watch(store: Option<&Path>, key: &str, interval_ms: u64) -> Result<()> {
    let signal = OsSignal::new().watch(Duration::from_millis(interval_ms.max(1)));
    let printer = AdaptivePalette::default();
    let session = Session::open_with_sink(store, key, signal, move |appearance: Appearance| {
        printer.apply(appearance);
        println!("{}", printer.paint(appearance.as_str(), appearance.as_str()));
    })?;
    eprintln!("{}", session.watch_hint());

    for line in io::stdin().lock().lines() {
        line.context("could not read stdin")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade::ManualSignal;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(dir: &TempDir, prefers_dark: bool) -> Session {
        let path = dir.path().join("prefs.json");
        Session::open(Some(&path), "theme", ManualSignal::new(prefers_dark)).unwrap()
    }

    #[test]
    fn test_set_persists_between_sessions() {
        let dir = TempDir::new().unwrap();
        session(&dir, false).set(Preference::Dark);

        let status = session(&dir, false).status();
        assert_eq!(status.preference, Preference::Dark);
        assert_eq!(status.appearance, "dark");
        assert!(status.persistent);
    }

    #[test]
    fn test_toggle_leaves_system_mode() {
        let dir = TempDir::new().unwrap();
        let first = session(&dir, true);
        assert_eq!(first.status().preference, Preference::System);
        assert!(first.toggle().contains("light"));
        assert_eq!(first.status().preference, Preference::Light);
    }

    #[test]
    fn test_watch_hint_explains_how_to_stop() {
        let dir = TempDir::new().unwrap();
        let following = session(&dir, false).watch_hint();
        assert!(following.contains("close stdin"));
        assert!(following.contains("following the system"));

        session(&dir, false).set(Preference::Dark);
        let pinned = session(&dir, false).watch_hint();
        assert!(pinned.contains("Dark"));
        assert!(pinned.contains("Ctrl-D"));
    }

    #[test]
    fn test_status_json_shape() {
        let dir = TempDir::new().unwrap();
        let json = session(&dir, true).render_status(true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["preference"], "system");
        assert_eq!(value["appearance"], "dark");
        assert_eq!(value["system_prefers_dark"], true);
    }

    #[test]
    fn test_status_text_mentions_each_field() {
        let dir = TempDir::new().unwrap();
        let text = session(&dir, false).render_status(false).unwrap();
        assert!(text.contains("preference:"));
        assert!(text.contains("System"));
        assert!(text.contains("appearance:"));
    }

    #[test]
    fn test_sink_forwarding_sees_signal_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let signal = Arc::new(ManualSignal::new(false));
        let seen = shade::RecordingSink::new();
        let _session =
            Session::open_with_sink(Some(&path), "theme", Arc::clone(&signal), seen.clone())
                .unwrap();

        signal.set(true);
        assert_eq!(seen.history(), vec![Appearance::Light, Appearance::Dark]);
    }
}
