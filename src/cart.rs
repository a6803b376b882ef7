//! Cart

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    discounts::DiscountPolicy,
    lines::{CartLine, InvalidArgument, Product, validate_product},
    persistence::{CartSlot, CorruptedState, CorruptionReason, LoadIssue, PersistenceWarning},
    pricing::{PriceBreakdown, PricingError, price},
    storage::KeyValueStore,
    subscriptions::{CartObserver, Subscribers, SubscriptionKey},
};

/// Errors that reject a cart mutation. The cart is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Malformed input.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// The resulting cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// What happened to the cart after a mutation was accepted.
#[derive(Debug)]
pub enum Outcome {
    /// The model was not in the cart, so nothing was persisted or notified.
    NotInCart,

    /// The mutation was applied and persisted.
    Saved,

    /// The mutation was applied in memory but could not be persisted.
    SaveFailed(PersistenceWarning),
}

impl Outcome {
    /// Whether the mutation was applied, persisted and notified.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::NotInCart)
    }

    /// Persistence warning to surface to the shopper, if any.
    pub fn warning(&self) -> Option<&PersistenceWarning> {
        match self {
            Outcome::SaveFailed(warning) => Some(warning),
            Outcome::NotInCart | Outcome::Saved => None,
        }
    }
}

/// Point-in-time view of the cart handed to observers and checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    /// Lines in insertion order
    pub lines: Vec<CartLine>,

    /// Totals for `lines`
    pub pricing: PriceBreakdown,
}

/// Shopping cart.
///
/// Holds at most one line per model. Every accepted change is priced,
/// written through to the cart's slot and then announced to subscribers.
#[derive(Debug)]
pub struct Cart<S> {
    lines: Vec<CartLine>,
    pricing: PriceBreakdown,
    policy: DiscountPolicy,
    slot: CartSlot<S>,
    subscribers: Subscribers,
}

impl<S: KeyValueStore> Cart<S> {
    /// Open the cart stored in `store` under the default key with the default
    /// discount policy.
    ///
    /// Any problem restoring the stored cart is returned next to the (then
    /// empty) cart.
    pub fn new(store: S) -> (Self, Option<LoadIssue>) {
        Self::open(CartSlot::new(store), DiscountPolicy::default())
    }

    /// Open the cart held in `slot`, priced with `policy`.
    ///
    /// Unreadable or corrupted slots yield an empty cart plus the issue.
    pub fn open(slot: CartSlot<S>, policy: DiscountPolicy) -> (Self, Option<LoadIssue>) {
        let restored = slot.load();
        let mut issue = restored.issue;

        let (lines, pricing) = match price(&restored.lines, &policy) {
            Ok(pricing) => (restored.lines, pricing),
            Err(error) => {
                warn!(key = slot.key(), %error, "stored cart cannot be priced, starting empty");

                issue = Some(LoadIssue::Corrupted(CorruptedState {
                    key: slot.key().to_string(),
                    reason: CorruptionReason::Pricing(error),
                }));

                (Vec::new(), PriceBreakdown::default())
            }
        };

        let cart = Self {
            lines,
            pricing,
            policy,
            slot,
            subscribers: Subscribers::new(),
        };

        (cart, issue)
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same model keeps its price and grows by
    /// `quantity`; otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidArgument`] if the product is malformed or
    /// `quantity` is zero, and [`CartError::Pricing`] if the cart total would
    /// overflow.
    pub fn add_item(&mut self, product: Product, quantity: u32) -> Result<Outcome, CartError> {
        validate_product(&product)?;

        if quantity == 0 {
            return Err(InvalidArgument::NonPositiveQuantity(product.model_id).into());
        }

        debug!(model_id = %product.model_id, quantity, "adding to cart");

        self.apply(|lines| {
            match lines
                .iter_mut()
                .find(|line| line.model_id() == product.model_id)
            {
                Some(line) => line.add_quantity(quantity)?,
                None => lines.push(CartLine::new(product, quantity)?),
            }

            Ok(true)
        })
    }

    /// Add a single unit of `product`.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_item`].
    pub fn add_one(&mut self, product: Product) -> Result<Outcome, CartError> {
        self.add_item(product, 1)
    }

    /// Remove the line for `model_id`. Absent models are ignored.
    ///
    /// # Errors
    ///
    /// Only fails if the remaining lines cannot be priced.
    pub fn remove_item(&mut self, model_id: &str) -> Result<Outcome, CartError> {
        debug!(model_id, "removing from cart");

        self.apply(|lines| {
            let before = lines.len();
            lines.retain(|line| line.model_id() != model_id);

            Ok(lines.len() != before)
        })
    }

    /// Set the quantity of the line for `model_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidArgument`] if `quantity` is zero, and
    /// [`CartError::Pricing`] if the cart total would overflow.
    pub fn set_quantity(&mut self, model_id: &str, quantity: u32) -> Result<Outcome, CartError> {
        if quantity == 0 {
            return Err(InvalidArgument::NonPositiveQuantity(model_id.to_string()).into());
        }

        debug!(model_id, quantity, "setting quantity");

        self.apply(|lines| {
            let Some(line) = find_line(lines, model_id) else {
                return Ok(false);
            };

            line.set_quantity(quantity)?;

            Ok(true)
        })
    }

    /// Add one unit to the line for `model_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidArgument`] if the quantity would overflow,
    /// and [`CartError::Pricing`] if the cart total would overflow.
    pub fn increment(&mut self, model_id: &str) -> Result<Outcome, CartError> {
        debug!(model_id, "incrementing");

        self.apply(|lines| {
            let Some(line) = find_line(lines, model_id) else {
                return Ok(false);
            };

            line.add_quantity(1)?;

            Ok(true)
        })
    }

    /// Remove one unit from the line for `model_id`, keeping at least one.
    ///
    /// # Errors
    ///
    /// Only fails if the cart cannot be priced.
    pub fn decrement(&mut self, model_id: &str) -> Result<Outcome, CartError> {
        debug!(model_id, "decrementing");

        self.apply(|lines| {
            let Some(line) = find_line(lines, model_id) else {
                return Ok(false);
            };

            line.decrement();

            Ok(true)
        })
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Never fails in practice; an empty cart always prices to zero.
    pub fn clear(&mut self) -> Result<Outcome, CartError> {
        debug!("clearing cart");

        self.apply(|lines| {
            lines.clear();

            Ok(true)
        })
    }

    /// Register an observer for future changes.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) -> SubscriptionKey {
        self.subscribers.subscribe(observer)
    }

    /// Stop notifying the observer registered under `key`.
    ///
    /// Returns `false` if it had already been removed.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.unsubscribe(key)
    }

    /// Try to write the current lines to the slot again, e.g. after an earlier
    /// [`Outcome::SaveFailed`].
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceWarning`] if the write fails again.
    pub fn persist(&mut self) -> Result<(), PersistenceWarning> {
        self.slot.save(&self.lines)
    }

    fn apply<F>(&mut self, change: F) -> Result<Outcome, CartError>
    where
        F: FnOnce(&mut Vec<CartLine>) -> Result<bool, InvalidArgument>,
    {
        let mut lines = self.lines.clone();

        if !change(&mut lines)? {
            return Ok(Outcome::NotInCart);
        }

        let pricing = price(&lines, &self.policy)?;

        self.lines = lines;
        self.pricing = pricing;

        let outcome = match self.slot.save(&self.lines) {
            Ok(()) => Outcome::Saved,
            Err(warning) => {
                warn!(key = self.slot.key(), %warning, "cart change not persisted");

                Outcome::SaveFailed(warning)
            }
        };

        let snapshot = self.snapshot();
        self.subscribers.notify(&snapshot);

        Ok(outcome)
    }
}

impl<S> Cart<S> {
    /// Current lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for `model_id`, if present.
    pub fn line(&self, model_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.model_id() == model_id)
    }

    /// Totals for the current lines.
    pub fn pricing(&self) -> &PriceBreakdown {
        &self.pricing
    }

    /// Owned copy of the current lines and totals.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            pricing: self.pricing,
        }
    }

    /// Discount policy used for pricing
    pub fn policy(&self) -> &DiscountPolicy {
        &self.policy
    }

    /// Slot the cart is persisted to
    pub fn slot(&self) -> &CartSlot<S> {
        &self.slot
    }

    /// Number of distinct lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn find_line<'a>(lines: &'a mut [CartLine], model_id: &str) -> Option<&'a mut CartLine> {
    lines.iter_mut().find(|line| line.model_id() == model_id)
}
