use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use directories::ProjectDirs;
use serde_json::{Map, Value};

use super::PreferenceStore;
use crate::error::StoreError;

/// Environment variable that overrides the directory holding the store file.
pub const CONFIG_DIR_ENV: &str = "SHADE_CONFIG_DIR";

/// File name of the default store.
pub const STORE_FILE_NAME: &str = "preferences.json";

// Fields written by other tools may hold any JSON type and are kept as-is.
type Records = Map<String, Value>;

/// Preference store backed by a single JSON object file.
///
/// Every key is a top-level string field. Saving keeps the other fields
/// already in the file, whatever their type, and replaces the file
/// atomically. Only a file that is not a JSON object counts as corrupt.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Opens the store at its default location.
    ///
    /// Uses `$SHADE_CONFIG_DIR/preferences.json` when the variable is set
    /// and non-empty, otherwise the platform config directory.
    pub fn default_location() -> Result<Self, StoreError> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir).join(STORE_FILE_NAME)));
        }
        let dirs = ProjectDirs::from("", "", "shade").ok_or_else(|| {
            StoreError::Unavailable("no home directory for the current user".to_string())
        })?;
        Ok(Self::new(dirs.config_dir().join(STORE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Option<Records>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write_records(&self, records: &Records) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let serialized = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }
}

impl PreferenceStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .read_records()?
            .and_then(|mut records| records.remove(key))
            .map(|value| match value {
                Value::String(text) => text,
                other => other.to_string(),
            }))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = match self.read_records() {
            Ok(records) => records.unwrap_or_default(),
            Err(StoreError::Corrupt(err)) => {
                tracing::warn!(path = %self.path.display(), error = %err, "replacing corrupt preference store");
                Records::new()
            }
            Err(err) => return Err(err),
        };
        records.insert(key.to_string(), Value::String(value.to_string()));
        self.write_records(&records)
    }
}
