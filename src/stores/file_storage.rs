//! File Storage
//!
//! A file-based persistent key-value storage. All entries live in a single
//! JSON object file that is re-read on every access, so several handles (or
//! processes) pointing at the same path observe each other's writes.
//!
//! Once a write fails the handle switches to its in-memory copy and reads
//! from it until a later write reaches the file again.

use crate::stores::Storage;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

type Entries = BTreeMap<String, String>;

/// Durable storage backed by a JSON file, with an in-memory fallback when the
/// file cannot be written.
///
/// # Example
///
/// ```rust,ignore
/// use teaming_admin::stores::FileStorage;
///
/// // Default location under the user's config directory
/// let storage = FileStorage::in_config_dir();
///
/// // Custom path
/// let storage = FileStorage::new("./storage.json");
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// The storage file path.
    path: PathBuf,

    /// Fallback in-memory entries when file operations fail.
    fallback: RwLock<Option<Entries>>,
}

impl FileStorage {
    /// Creates a new FileStorage at `path`. The file is created lazily on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback: RwLock::new(None),
        }
    }

    /// Creates a FileStorage at `<config_dir>/teaming-admin/storage.json`,
    /// falling back to the working directory.
    pub fn in_config_dir() -> Self {
        Self::new(Self::default_path())
    }

    fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("teaming-admin").join("storage.json"))
            .unwrap_or_else(|| PathBuf::from(".teaming_admin_storage.json"))
    }

    /// Returns the storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ---------------------------------------------------------------
    // Internal helpers:
    // ---------------------------------------------------------------

    fn read_entries(&self) -> Entries {
        if let Some(entries) = self
            .fallback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return entries.clone();
        }

        if let Ok(contents) = fs::read_to_string(&self.path) {
            if let Ok(entries) = serde_json::from_str::<Entries>(&contents) {
                return entries;
            }
        }

        Entries::new()
    }

    fn write_entries(&self, entries: Entries) {
        match self.try_write(&entries) {
            Ok(()) => {
                *self.fallback.write().unwrap_or_else(PoisonError::into_inner) = None;
            }
            Err(err) => {
                tracing::warn!(
                    "Could not write {}: {}; keeping storage in memory",
                    self.path.display(),
                    err
                );
                *self.fallback.write().unwrap_or_else(PoisonError::into_inner) = Some(entries);
            }
        }
    }

    fn try_write(&self, entries: &Entries) -> std::io::Result<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                    // the file must not outlive a clear
                    tracing::debug!("Could not remove {}: {}", self.path.display(), err);
                    fs::write(&self.path, "{}")
                }
                _ => Ok(()),
            };
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;

        // Tokens live here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(entries);
    }

    fn remove_item(&self, key: &str) {
        self.remove_items(&[key]);
    }

    fn remove_items(&self, keys: &[&str]) {
        let mut entries = self.read_entries();
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() != before {
            self.write_entries(entries);
        }
    }
}
