//! Phone Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartSnapshot, Outcome},
    catalog::{Catalog, CatalogError},
    checkout::{CheckoutError, CustomerDetails, OrderItem, OrderPayload, PaymentRequest},
    config::{CartConfig, ConfigError},
    discounts::{DiscountError, DiscountPolicy},
    lines::{CartLine, InvalidArgument, Product},
    persistence::{CartSlot, CorruptedState, LoadIssue, PersistenceWarning},
    pricing::{PriceBreakdown, PricingError, price},
    storage::{DirectoryStore, KeyValueStore, MemoryStore, StorageError},
    subscriptions::{CartObserver, SubscriptionKey},
    summary::{CartSummary, SummaryError},
};
