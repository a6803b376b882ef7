//! Durable key-value storage
//!
//! The cart persists into a single named slot of a key-value area. Backends
//! implement [`KeyValueStore`]; the cart never touches them directly, only
//! through [`crate::persistence::CartSlot`].

use std::io;

use mockall::automock;
use thiserror::Error;

mod directory;
mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file system failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Writing the value would exceed the storage quota.
    #[error("writing {key} needs {needed} bytes but the quota is {quota} bytes")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Bytes the area would hold after the write
        needed: usize,
        /// Maximum bytes the area may hold
        quota: usize,
    },

    /// The key cannot be used by this backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A durable area of string slots addressed by key.
#[automock]
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value cannot be stored.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

fn check_quota(
    key: &str,
    needed: usize,
    quota: Option<usize>,
) -> Result<(), StorageError> {
    match quota {
        Some(quota) if needed > quota => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        }),
        _ => Ok(()),
    }
}
