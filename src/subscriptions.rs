//! Change notification
//!
//! Views register a [`CartObserver`] and receive the new [`CartSnapshot`]
//! after every successful mutation. Delivery is synchronous, in the
//! same call as the mutation. No ordering between observers is promised.

use std::fmt;

use slotmap::{SlotMap, new_key_type};

use crate::cart::CartSnapshot;

new_key_type! {
    /// Handle returned by [`Subscribers::subscribe`], used to unsubscribe.
    pub struct SubscriptionKey;
}

/// Receives cart changes.
pub trait CartObserver {
    /// Called with the cart state right after a mutation.
    fn on_change(&mut self, snapshot: &CartSnapshot);
}

impl<F> CartObserver for F
where
    F: FnMut(&CartSnapshot),
{
    fn on_change(&mut self, snapshot: &CartSnapshot) {
        self(snapshot);
    }
}

/// Registered observers.
#[derive(Default)]
pub struct Subscribers {
    observers: SlotMap<SubscriptionKey, Box<dyn CartObserver>>,
}

impl Subscribers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) -> SubscriptionKey {
        self.observers.insert(Box::new(observer))
    }

    /// Remove the observer registered under `key`.
    ///
    /// Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.observers.remove(key).is_some()
    }

    /// Deliver `snapshot` to every observer.
    pub fn notify(&mut self, snapshot: &CartSnapshot) {
        for observer in self.observers.values_mut() {
            observer.on_change(snapshot);
        }
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("observers", &self.observers.len())
            .finish()
    }
}
