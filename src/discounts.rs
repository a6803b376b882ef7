//! Discounts

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when building a discount policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// A rate fell outside `[0, 1]` (field name, value).
    #[error("{0} must be between 0 and 1, got {1}")]
    RateOutOfRange(&'static str, Decimal),
}

/// Quantity tiered discount.
///
/// Every unit beyond the first takes `per_unit` off the whole cart, up to `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPolicy {
    per_unit: Decimal,
    cap: Decimal,
}

impl DiscountPolicy {
    /// Create a policy from percentages.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::RateOutOfRange`] if either rate is outside `[0, 1]`.
    pub fn new(per_unit: Percentage, cap: Percentage) -> Result<Self, DiscountError> {
        Self::from_rates(per_unit * Decimal::ONE, cap * Decimal::ONE)
    }

    /// Create a policy from decimal fractions (`0.02` is 2%).
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::RateOutOfRange`] if either rate is outside `[0, 1]`.
    pub fn from_rates(per_unit: Decimal, cap: Decimal) -> Result<Self, DiscountError> {
        ensure_fraction("per_unit", per_unit)?;
        ensure_fraction("cap", cap)?;

        Ok(Self { per_unit, cap })
    }

    /// Rate taken off for each unit beyond the first
    pub fn per_unit(&self) -> Decimal {
        self.per_unit
    }

    /// Maximum rate
    pub fn cap(&self) -> Decimal {
        self.cap
    }

    /// Discount rate for a cart holding `total_items` units.
    pub fn rate_for(&self, total_items: u64) -> Decimal {
        if total_items <= 1 {
            return Decimal::ZERO;
        }

        let extra = Decimal::from(total_items - 1);

        // Anything past the cap is irrelevant, so an overflowing product is the cap.
        let rate = extra.checked_mul(self.per_unit).unwrap_or(self.cap);

        rate.min(self.cap)
    }
}

impl Default for DiscountPolicy {
    /// 2% per unit beyond the first, capped at 20%.
    fn default() -> Self {
        Self {
            per_unit: Decimal::new(2, 2),
            cap: Decimal::new(20, 2),
        }
    }
}

fn ensure_fraction(name: &'static str, rate: Decimal) -> Result<(), DiscountError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(DiscountError::RateOutOfRange(name, rate));
    }

    Ok(())
}
