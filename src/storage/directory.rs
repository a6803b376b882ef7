//! Directory storage

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{KeyValueStore, StorageError, check_quota};

const SLOT_EXTENSION: &str = "json";

/// Key-value area backed by a directory, one file per key.
///
/// Values are written to a temporary file and renamed into place so a crash
/// mid-write never leaves a half-written slot behind.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    quota: Option<usize>,
}

impl DirectoryStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();

        fs::create_dir_all(&root)?;

        Ok(Self { root, quota: None })
    }

    /// Limit the total bytes held by all slots in the directory.
    #[must_use]
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Directory holding the slots
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{key}.{SLOT_EXTENSION}")))
    }

    fn used_bytes_excluding(&self, excluded: &Path) -> Result<usize, StorageError> {
        let mut used = 0_usize;

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();

            if path == excluded
                || path.extension().and_then(|ext| ext.to_str()) != Some(SLOT_EXTENSION)
            {
                continue;
            }

            let len = fs::metadata(&path)?.len();
            used = used.saturating_add(usize::try_from(len).unwrap_or(usize::MAX));
        }

        Ok(used)
    }
}

impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;

        if self.quota.is_some() {
            let needed = self.used_bytes_excluding(&path)? + value.len();
            check_quota(key, needed, self.quota)?;
        }

        let staging = path.with_extension("tmp");

        fs::write(&staging, value)?;

        if let Err(error) = fs::rename(&staging, &path) {
            _ = fs::remove_file(&staging);

            return Err(error.into());
        }

        debug!(key, bytes = value.len(), path = %path.display(), "slot written");

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
