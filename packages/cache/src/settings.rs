//! Small persisted key/value settings file.
//!
//! Holds values that must outlive the process, such as the directory the
//! user granted for report storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::CacheError;

/// Settings key for the granted report directory.
pub const DIRECTORY_KEY: &str = "directoryUri";

/// A JSON object of string settings backed by a file.
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Reads the settings file, starting empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the file exists but cannot be read or
    /// parsed.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        let values = match tokio::fs::read_to_string(path).await {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Settings at `path` with no values; nothing is written until
    /// [`Settings::set`].
    #[must_use]
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            values: BTreeMap::new(),
        }
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Sets `key` and writes the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the file cannot be written.
    pub async fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), CacheError> {
        self.values.insert(key.to_string(), value.into());
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
