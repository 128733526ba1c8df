//! Storage and parsing errors.
//!
//! None of these reach callers of [`PreferenceController`](crate::PreferenceController);
//! the controller logs them and falls back. They are public so store
//! implementations can report them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error returned by a [`PreferenceStore`](crate::PreferenceStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be read.
    #[error("failed to read preference store at {}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    /// The backing storage could not be written.
    #[error("failed to write preference store at {}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    /// The stored data could not be decoded.
    #[error("preference store is corrupt")]
    Corrupt(#[from] serde_json::Error),
    /// No storage exists for this session (no home directory, sandboxed host).
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

/// A stored or user-supplied preference string that names no preference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized preference '{value}', expected light, dark or system")]
pub struct ParsePreferenceError {
    value: String,
}

impl ParsePreferenceError {
    pub(crate) fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }
}
