//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shade::signal::DEFAULT_POLL_INTERVAL;
use shade::{Preference, DEFAULT_STORAGE_KEY};

/// Manage the light/dark appearance preference.
#[derive(Debug, Parser)]
#[command(name = "shade", version, about)]
pub struct Cli {
    /// Preference file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Key of the preference record inside the store.
    #[arg(long, global = true, default_value = DEFAULT_STORAGE_KEY)]
    pub key: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the stored preference, the system signal and the result.
    Status {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Store a preference: light, dark or system.
    Set { preference: Preference },
    /// Switch to the opposite of the current appearance.
    Toggle,
    /// Follow the system and print every change until stdin closes.
    Watch {
        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        interval_ms: u64,
    },
}
