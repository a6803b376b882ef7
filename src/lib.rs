//! Phone Cart
//!
//! Cart pricing and state engine for a phone storefront: a persistent list of
//! products with quantities, a tiered quantity discount and change
//! notification for views.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod discounts;
pub mod lines;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod storage;
pub mod subscriptions;
pub mod summary;
