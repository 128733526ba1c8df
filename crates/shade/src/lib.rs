//! # Shade - appearance preferences that follow the system
//!
//! Shade owns a user's light/dark display preference, resolves it against
//! the operating system's dark-mode signal, persists explicit choices and
//! keeps the presentation layer in step as the system changes.
//!
//! ## Concepts
//!
//! - [`Preference`]: what the user asked for (`Light`, `Dark` or `System`)
//! - [`Appearance`]: what is shown, always `Light` or `Dark`
//! - [`resolve`]: the pure mapping from preference and signal to appearance
//! - [`PreferenceController`]: ties a [`PreferenceStore`], a [`SystemSignal`]
//!   and an [`AppearanceSink`] together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shade::{AdaptivePalette, FileStore, OsSignal, Preference, PreferenceController};
//! use std::time::Duration;
//!
//! let palette = AdaptivePalette::default();
//! let mut controller = PreferenceController::builder()
//!     .store(FileStore::default_location().unwrap())
//!     .signal(OsSignal::new().watch(Duration::from_secs(2)))
//!     .sink(palette.clone())
//!     .build();
//!
//! let (preference, appearance) = controller.initialize();
//! println!("{}", palette.paint("title", &format!("{preference} -> {appearance}")));
//!
//! controller.set_preference(Preference::Dark);
//! ```
//!
//! ## Failure handling
//!
//! Display preference is not critical, so the controller never returns an
//! error. A missing or corrupt record falls back to [`Preference::System`];
//! a store that cannot be read or written is logged through `tracing` and
//! the controller keeps working in memory for the rest of the session.

mod appearance;
mod controller;
mod error;
mod palette;
mod sink;

pub mod signal;
pub mod store;

pub use appearance::{resolve, Appearance, Preference};
pub use controller::{PreferenceController, PreferenceControllerBuilder, Snapshot};
pub use error::{ParsePreferenceError, StoreError};
pub use palette::{AdaptivePalette, Palette};
pub use signal::{ManualSignal, OsSignal, Subscription, SystemSignal};
pub use sink::{AppearanceSink, RecordingSink};
pub use store::{FileStore, MemoryStore, PreferenceStore, DEFAULT_STORAGE_KEY};
