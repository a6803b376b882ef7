//! Cart persistence
//!
//! [`CartSlot`] reads and writes the cart's lines as a JSON array under one
//! key of a [`KeyValueStore`]. Reading never fails hard: an absent slot is an
//! empty cart, and an unreadable or corrupted slot degrades to an empty cart
//! with the problem reported alongside. Write failures come back as a
//! [`PersistenceWarning`]; the in-memory cart stays authoritative.

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    lines::{CartLine, InvalidArgument},
    pricing::PricingError,
    storage::{KeyValueStore, StorageError},
};

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_SLOT_KEY: &str = "cart";

/// Non-fatal failure to persist the cart.
#[derive(Debug, Error)]
pub enum PersistenceWarning {
    /// The lines could not be serialised.
    #[error("failed to serialise cart: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store rejected the write.
    #[error("failed to write cart slot {key}: {source}")]
    Write {
        /// Slot key
        key: String,
        /// Backend failure
        #[source]
        source: StorageError,
    },
}

/// Why a stored cart could not be used.
#[derive(Debug, Error)]
pub enum CorruptionReason {
    /// The slot is not a JSON array of lines.
    #[error("unparsable contents: {0}")]
    Parse(#[from] serde_json::Error),

    /// A line breaks the cart line rules.
    #[error("invalid line: {0}")]
    InvalidLine(#[from] InvalidArgument),

    /// Two lines share a model id.
    #[error("duplicate line for model {0}")]
    DuplicateModel(String),

    /// The lines are valid on their own but their totals overflow.
    #[error("unpriceable contents: {0}")]
    Pricing(#[from] PricingError),
}

/// Persisted cart data that could not be restored.
#[derive(Debug, Error)]
#[error("cart slot {key} is corrupted: {reason}")]
pub struct CorruptedState {
    /// Slot key
    pub key: String,

    /// What was wrong with the contents
    #[source]
    pub reason: CorruptionReason,
}

/// Problems met while restoring a cart.
#[derive(Debug, Error)]
pub enum LoadIssue {
    /// The slot held data that is not a valid cart.
    #[error(transparent)]
    Corrupted(#[from] CorruptedState),

    /// The store could not be read.
    #[error("cart slot {key} is unreadable: {source}")]
    Unreadable {
        /// Slot key
        key: String,
        /// Backend failure
        #[source]
        source: StorageError,
    },
}

/// Result of restoring a cart from its slot.
#[derive(Debug, Default)]
pub struct Restored {
    /// Restored lines, empty when nothing usable was stored
    pub lines: Vec<CartLine>,

    /// Problem that forced an empty cart, if any
    pub issue: Option<LoadIssue>,
}

/// A named slot holding a serialised cart.
#[derive(Debug)]
pub struct CartSlot<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartSlot<S> {
    /// Use the default slot key in `store`.
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_SLOT_KEY)
    }

    /// Use `key` in `store`.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Slot key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying store, mutably
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Restore the stored lines.
    pub fn load(&self) -> Restored {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Restored::default(),
            Err(source) => {
                warn!(key = %self.key, error = %source, "cart slot unreadable, starting empty");

                return Restored {
                    lines: Vec::new(),
                    issue: Some(LoadIssue::Unreadable {
                        key: self.key.clone(),
                        source,
                    }),
                };
            }
        };

        match decode(&raw) {
            Ok(lines) => {
                debug!(key = %self.key, lines = lines.len(), "cart restored");

                Restored { lines, issue: None }
            }
            Err(reason) => {
                warn!(key = %self.key, error = %reason, "cart slot corrupted, starting empty");

                Restored {
                    lines: Vec::new(),
                    issue: Some(LoadIssue::Corrupted(CorruptedState {
                        key: self.key.clone(),
                        reason,
                    })),
                }
            }
        }
    }

    /// Overwrite the slot with `lines`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceWarning`] if the lines cannot be serialised or
    /// the store rejects the write.
    pub fn save(&mut self, lines: &[CartLine]) -> Result<(), PersistenceWarning> {
        let encoded = serde_json::to_string(lines)?;

        self.store
            .set(&self.key, &encoded)
            .map_err(|source| PersistenceWarning::Write {
                key: self.key.clone(),
                source,
            })
    }
}

/// Parse and check the contents of a cart slot.
///
/// A literal `null` is treated as an empty cart.
///
/// # Errors
///
/// Returns a [`CorruptionReason`] if the contents are not a JSON array of
/// valid lines with distinct model ids.
pub fn decode(raw: &str) -> Result<Vec<CartLine>, CorruptionReason> {
    let lines: Option<Vec<CartLine>> = serde_json::from_str(raw)?;
    let lines = lines.unwrap_or_default();

    let mut seen = FxHashSet::default();

    for line in &lines {
        line.validate()?;

        if !seen.insert(line.model_id()) {
            return Err(CorruptionReason::DuplicateModel(line.model_id().to_string()));
        }
    }

    Ok(lines)
}
