//! Cart summary
//!
//! Text rendering of a cart for terminals and logs. This is the only place
//! amounts are rounded to cents.

use std::io;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{cart::CartSnapshot, pricing::line_total};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// An amount does not fit in minor units.
    #[error("amount {0} cannot be displayed")]
    AmountOutOfRange(Decimal),

    /// Writing to the output failed.
    #[error("failed to write summary: {0}")]
    Io(#[from] io::Error),
}

/// Printable view of a cart snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CartSummary<'a> {
    snapshot: &'a CartSnapshot,
    currency: &'static Currency,
}

impl<'a> CartSummary<'a> {
    /// Summarise `snapshot`, showing amounts in `currency`.
    pub fn new(snapshot: &'a CartSnapshot, currency: &'static Currency) -> Self {
        Self { snapshot, currency }
    }

    /// Totals block.
    ///
    /// With a discount this lists the original total, the discount and the
    /// final total; otherwise only the total.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::AmountOutOfRange`] if an amount cannot be shown.
    pub fn totals(&self) -> Result<Vec<String>, SummaryError> {
        let pricing = &self.snapshot.pricing;

        if !pricing.is_discounted() {
            return Ok(vec![format!(
                "Total: {}",
                self.money(pricing.original_total)?
            )]);
        }

        Ok(vec![
            format!("Original: {}", self.money(pricing.original_total)?),
            format!(
                "Discount ({}%): -{}",
                percent_points(pricing.discount_rate),
                self.money(pricing.discount_amount)?
            ),
            format!("Total: {}", self.money(pricing.final_total)?),
        ])
    }

    /// Write the line table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if an amount cannot be shown or `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        if self.snapshot.lines.is_empty() {
            writeln!(out, "Your cart is empty.")?;
            return Ok(());
        }

        let mut builder = Builder::default();
        builder.push_record(["Item", "Unit Price", "Qty", "Line Total"]);

        for line in &self.snapshot.lines {
            let total = line_total(line).ok_or(SummaryError::AmountOutOfRange(line.unit_price()))?;

            builder.push_record([
                format!("{} - {}", line.brand(), line.model_id()),
                self.money(line.unit_price())?,
                line.quantity().to_string(),
                self.money(total)?,
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}")?;

        for total in self.totals()? {
            writeln!(out, "{total}")?;
        }

        Ok(())
    }

    fn money(&self, amount: Decimal) -> Result<String, SummaryError> {
        let minor = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|value| value.to_i64())
            .ok_or(SummaryError::AmountOutOfRange(amount))?;

        Ok(Money::from_minor(minor, self.currency).to_string())
    }
}

/// A fractional rate as whole percent points, rounding halves up (`0.125` is 13).
pub fn percent_points(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{cart::Cart, lines::tests::phone, storage::MemoryStore};

    use super::*;

    fn dollars(minor: i64) -> String {
        Money::from_minor(minor, USD).to_string()
    }

    #[test]
    fn undiscounted_cart_shows_only_the_total() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_one(phone("A", Decimal::from(100)))?;

        let snapshot = cart.snapshot();
        let totals = CartSummary::new(&snapshot, USD).totals()?;

        assert_eq!(totals, [format!("Total: {}", dollars(10_000))]);

        Ok(())
    }

    #[test]
    fn discounted_cart_shows_breakdown() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_item(phone("A", Decimal::from(100)), 2)?;

        let snapshot = cart.snapshot();
        let totals = CartSummary::new(&snapshot, USD).totals()?;

        assert_eq!(
            totals,
            [
                format!("Original: {}", dollars(20_000)),
                format!("Discount (2%): -{}", dollars(400)),
                format!("Total: {}", dollars(19_600)),
            ]
        );

        Ok(())
    }

    #[test]
    fn amounts_round_only_for_display() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_item(phone("A", Decimal::new(3333, 2)), 3)?;

        let snapshot = cart.snapshot();

        assert_eq!(snapshot.pricing.final_total, Decimal::new(959_904, 4));

        let totals = CartSummary::new(&snapshot, USD).totals()?;

        assert_eq!(totals.last(), Some(&format!("Total: {}", dollars(9599))));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_item(phone("Pixel", Decimal::from(500)), 2)?;

        let snapshot = cart.snapshot();
        let mut out = Vec::new();

        CartSummary::new(&snapshot, USD).write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Acme - Pixel"), "missing item row:\n{rendered}");
        assert!(rendered.contains(&dollars(100_000)), "missing line total:\n{rendered}");
        assert!(rendered.contains("Discount (2%)"), "missing discount:\n{rendered}");

        Ok(())
    }

    #[test]
    fn write_to_empty_cart() -> TestResult {
        let snapshot = CartSnapshot::default();
        let mut out = Vec::new();

        CartSummary::new(&snapshot, USD).write_to(&mut out)?;

        assert_eq!(String::from_utf8(out)?, "Your cart is empty.\n");

        Ok(())
    }

    #[test]
    fn percent_points_round_half_up() {
        assert_eq!(percent_points(Decimal::new(2, 2)), Decimal::from(2));
        assert_eq!(percent_points(Decimal::new(125, 3)), Decimal::from(13));
        assert_eq!(percent_points(Decimal::new(20, 2)), Decimal::from(20));
    }
}
