//! Cart lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed input to a cart mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    /// The product has no model identifier.
    #[error("model id must not be empty")]
    EmptyModelId,

    /// The product price is below zero (model id, price).
    #[error("model {0} has negative unit price {1}")]
    NegativePrice(String, Decimal),

    /// An explicit quantity of zero was given for a model.
    #[error("quantity for model {0} must be at least 1")]
    NonPositiveQuantity(String),

    /// The quantity of a line no longer fits the counter.
    #[error("quantity for model {0} overflowed")]
    QuantityOverflow(String),
}

/// Product record handed over by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog model name, unique per product
    pub model_id: String,

    /// Manufacturer
    pub brand: String,

    /// Name shown to shoppers
    pub display_name: String,

    /// Current selling price
    pub unit_price: Decimal,

    /// Product image location
    pub image_url: String,

    /// Backend product identifier, if the catalog supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
}

/// One product entry in the cart.
///
/// The unit price is a snapshot taken when the product was first added and is
/// never refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    model_id: String,
    brand: String,
    display_name: String,
    unit_price: Decimal,
    quantity: u32,
    image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    catalog_id: Option<String>,
}

impl CartLine {
    /// Build a line for `product` holding `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`] if the model id is empty, the price is
    /// negative or the quantity is zero.
    pub fn new(product: Product, quantity: u32) -> Result<Self, InvalidArgument> {
        validate_product(&product)?;

        if quantity == 0 {
            return Err(InvalidArgument::NonPositiveQuantity(product.model_id));
        }

        Ok(Self {
            model_id: product.model_id,
            brand: product.brand,
            display_name: product.display_name,
            unit_price: product.unit_price,
            quantity,
            image_url: product.image_url,
            catalog_id: product.catalog_id,
        })
    }

    /// Catalog model name
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Manufacturer
    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Name shown to shoppers
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Price per unit at the time the line was created
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Number of units, always at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Product image location
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Backend product identifier
    pub fn catalog_id(&self) -> Option<&str> {
        self.catalog_id.as_deref()
    }

    /// Replace the quantity.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::NonPositiveQuantity`] for a zero quantity.
    pub(crate) fn set_quantity(&mut self, quantity: u32) -> Result<(), InvalidArgument> {
        if quantity == 0 {
            return Err(InvalidArgument::NonPositiveQuantity(self.model_id.clone()));
        }

        self.quantity = quantity;

        Ok(())
    }

    /// Add `amount` units.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::QuantityOverflow`] if the counter would overflow.
    pub(crate) fn add_quantity(&mut self, amount: u32) -> Result<(), InvalidArgument> {
        self.quantity = self
            .quantity
            .checked_add(amount)
            .ok_or_else(|| InvalidArgument::QuantityOverflow(self.model_id.clone()))?;

        Ok(())
    }

    /// Remove one unit, never going below 1.
    pub(crate) fn decrement(&mut self) {
        self.quantity = self.quantity.saturating_sub(1).max(1);
    }

    /// Check a deserialised line still satisfies the construction rules.
    pub(crate) fn validate(&self) -> Result<(), InvalidArgument> {
        if self.model_id.is_empty() {
            return Err(InvalidArgument::EmptyModelId);
        }

        if self.unit_price < Decimal::ZERO {
            return Err(InvalidArgument::NegativePrice(
                self.model_id.clone(),
                self.unit_price,
            ));
        }

        if self.quantity == 0 {
            return Err(InvalidArgument::NonPositiveQuantity(self.model_id.clone()));
        }

        Ok(())
    }
}

/// Check a catalog product can be put in a cart.
///
/// # Errors
///
/// Returns an [`InvalidArgument`] if the model id is empty or the price is negative.
pub fn validate_product(product: &Product) -> Result<(), InvalidArgument> {
    if product.model_id.is_empty() {
        return Err(InvalidArgument::EmptyModelId);
    }

    if product.unit_price < Decimal::ZERO {
        return Err(InvalidArgument::NegativePrice(
            product.model_id.clone(),
            product.unit_price,
        ));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use testresult::TestResult;

    use super::*;

    pub(crate) fn phone(model_id: &str, price: Decimal) -> Product {
        Product {
            model_id: model_id.to_string(),
            brand: "Acme".to_string(),
            display_name: format!("Acme {model_id}"),
            unit_price: price,
            image_url: format!("https://img.example/{model_id}.png"),
            catalog_id: None,
        }
    }

    #[test]
    fn new_line_copies_product_fields() -> TestResult {
        let mut product = phone("A", Decimal::new(19_999, 2));
        product.catalog_id = Some("42".to_string());

        let line = CartLine::new(product, 3)?;

        assert_eq!(line.model_id(), "A");
        assert_eq!(line.brand(), "Acme");
        assert_eq!(line.display_name(), "Acme A");
        assert_eq!(line.unit_price(), Decimal::new(19_999, 2));
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.image_url(), "https://img.example/A.png");
        assert_eq!(line.catalog_id(), Some("42"));

        Ok(())
    }

    #[test]
    fn new_line_rejects_zero_quantity() {
        let result = CartLine::new(phone("A", Decimal::ONE), 0);

        assert_eq!(
            result,
            Err(InvalidArgument::NonPositiveQuantity("A".to_string()))
        );
    }

    #[test]
    fn new_line_rejects_negative_price() {
        let result = CartLine::new(phone("A", Decimal::NEGATIVE_ONE), 1);

        assert_eq!(
            result,
            Err(InvalidArgument::NegativePrice(
                "A".to_string(),
                Decimal::NEGATIVE_ONE
            ))
        );
    }

    #[test]
    fn new_line_rejects_empty_model_id() {
        let result = CartLine::new(phone("", Decimal::ONE), 1);

        assert_eq!(result, Err(InvalidArgument::EmptyModelId));
    }

    #[test]
    fn zero_price_is_allowed() -> TestResult {
        let line = CartLine::new(phone("Free", Decimal::ZERO), 1)?;

        assert_eq!(line.unit_price(), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn decrement_floors_at_one() -> TestResult {
        let mut line = CartLine::new(phone("A", Decimal::ONE), 2)?;

        line.decrement();
        line.decrement();
        line.decrement();

        assert_eq!(line.quantity(), 1);

        Ok(())
    }

    #[test]
    fn add_quantity_reports_overflow() -> TestResult {
        let mut line = CartLine::new(phone("A", Decimal::ONE), u32::MAX)?;

        let result = line.add_quantity(1);

        assert_eq!(
            result,
            Err(InvalidArgument::QuantityOverflow("A".to_string()))
        );
        assert_eq!(line.quantity(), u32::MAX);

        Ok(())
    }

    #[test]
    fn serialises_with_camel_case_fields() -> TestResult {
        let line = CartLine::new(phone("A", Decimal::new(100, 0)), 2)?;

        let json = serde_json::to_value(&line)?;

        assert_eq!(json["modelId"], "A");
        assert_eq!(json["displayName"], "Acme A");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["imageUrl"], "https://img.example/A.png");
        assert!(json.get("catalogId").is_none(), "absent id is omitted");

        Ok(())
    }

    #[test]
    fn deserialises_numeric_prices() -> TestResult {
        let json = r#"{
            "modelId": "A",
            "brand": "Acme",
            "displayName": "Acme A",
            "unitPrice": 249.5,
            "quantity": 1,
            "imageUrl": ""
        }"#;

        let line: CartLine = serde_json::from_str(json)?;

        assert_eq!(line.unit_price(), Decimal::new(2495, 1));

        Ok(())
    }
}
