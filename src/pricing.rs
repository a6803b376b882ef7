//! Pricing

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::{discounts::DiscountPolicy, lines::CartLine};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// A total no longer fits in a decimal.
    #[error("cart total overflowed")]
    Overflow,
}

/// Derived totals for a set of cart lines.
///
/// Values keep full decimal precision; rounding to cents only happens when they
/// are displayed or handed to the payment service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Sum of all line quantities
    pub total_items: u64,

    /// Sum of unit price times quantity before any discount
    pub original_total: Decimal,

    /// Fraction taken off the original total
    pub discount_rate: Decimal,

    /// Amount taken off the original total
    pub discount_amount: Decimal,

    /// Amount payable
    pub final_total: Decimal,
}

impl PriceBreakdown {
    /// Whether any discount applies.
    pub fn is_discounted(&self) -> bool {
        self.discount_amount > Decimal::ZERO
    }
}

/// Price a sequence of lines under `policy`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if a total cannot be represented.
pub fn price(lines: &[CartLine], policy: &DiscountPolicy) -> Result<PriceBreakdown, PricingError> {
    let (original_total, total_items) = lines
        .iter()
        .try_fold((Decimal::ZERO, 0_u64), |(total, items), line| {
            Some((
                total.checked_add(line_total(line)?)?,
                items.checked_add(u64::from(line.quantity()))?,
            ))
        })
        .ok_or(PricingError::Overflow)?;

    let discount_rate = policy.rate_for(total_items);

    let discount_amount = original_total
        .checked_mul(discount_rate)
        .ok_or(PricingError::Overflow)?;

    let final_total = original_total
        .checked_sub(discount_amount)
        .ok_or(PricingError::Overflow)?;

    Ok(PriceBreakdown {
        total_items,
        original_total,
        discount_rate,
        discount_amount,
        final_total,
    })
}

/// Unit price times quantity for a single line.
pub fn line_total(line: &CartLine) -> Option<Decimal> {
    line.unit_price().checked_mul(Decimal::from(line.quantity()))
}
