//! Durable key-value storage for the preference record.
//!
//! - [`PreferenceStore`]: the storage contract the controller consumes
//! - [`MemoryStore`]: in-process map, shared between clones
//! - [`FileStore`]: JSON file on disk
//!
//! Stores deal in raw strings; turning them into a [`Preference`](crate::Preference)
//! is the controller's job.

mod file;
mod memory;

pub use file::{FileStore, CONFIG_DIR_ENV, STORE_FILE_NAME};
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Key under which the preference record is stored unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "theme";

/// Key-value storage for preference records.
pub trait PreferenceStore: Send + Sync {
    /// Reads the value under `key`. A missing record is `Ok(None)`.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }
}
