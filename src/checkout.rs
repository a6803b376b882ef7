//! Checkout
//!
//! Payloads handed to the order and payment services. The cart builds them
//! from its current snapshot but never talks to those services itself, and it
//! is only cleared once the caller reports the order went through.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{Cart, CartError, Outcome},
    lines::CartLine,
    storage::KeyValueStore,
};

/// Errors raised while preparing a checkout payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// A required contact field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Contact and delivery details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Name the order is placed under
    pub full_name: String,

    /// Contact email
    pub email: String,

    /// Contact phone, also the payment account number
    pub phone: String,

    /// Delivery address
    pub address: String,
}

impl CustomerDetails {
    /// Check every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let fields = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ];

        match fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(CheckoutError::MissingField(name)),
            None => Ok(()),
        }
    }
}

/// One product in a bulk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    /// Backend product identifier
    pub phone_id: Option<String>,

    /// Catalog model name
    pub model_name: String,

    /// Units ordered
    pub quantity: u32,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            phone_id: line.catalog_id().map(str::to_string),
            model_name: line.model_id().to_string(),
            quantity: line.quantity(),
        }
    }
}

/// Bulk order handed to the order submission service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPayload {
    /// Who is ordering
    #[serde(flatten)]
    pub customer: CustomerDetails,

    /// Discounted total, unrounded
    pub total_price: Decimal,

    /// Ordered products
    pub items: Vec<OrderItem>,
}

/// Payment initiation request.
///
/// Carries only the amount payable and references generated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    /// Account charged
    pub account_no: String,

    /// Caller generated payment reference
    pub reference_id: String,

    /// Caller generated invoice reference
    pub invoice_id: String,

    /// Amount in major units with exactly two decimals
    pub amount: String,
}

impl PaymentRequest {
    /// Build a payment request for `amount`.
    pub fn new(
        account_no: impl Into<String>,
        reference_id: impl Into<String>,
        invoice_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            account_no: account_no.into(),
            reference_id: reference_id.into(),
            invoice_id: invoice_id.into(),
            amount: format_amount(amount),
        }
    }
}

/// Format `amount` with two decimals, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    rounded.to_string()
}

impl<S: KeyValueStore> Cart<S> {
    /// Build the bulk order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart and
    /// [`CheckoutError::MissingField`] for incomplete customer details.
    pub fn order_payload(&self, customer: CustomerDetails) -> Result<OrderPayload, CheckoutError> {
        if self.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        customer.validate()?;

        Ok(OrderPayload {
            customer,
            total_price: self.pricing().final_total,
            items: self.lines().iter().map(OrderItem::from).collect(),
        })
    }

    /// Build a payment request for the cart's final total.
    pub fn payment_request(
        &self,
        account_no: impl Into<String>,
        reference_id: impl Into<String>,
        invoice_id: impl Into<String>,
    ) -> PaymentRequest {
        PaymentRequest::new(
            account_no,
            reference_id,
            invoice_id,
            self.pricing().final_total,
        )
    }

    /// Record that the order service accepted the order, emptying the cart.
    ///
    /// # Errors
    ///
    /// See [`Cart::clear`].
    pub fn order_submitted(&mut self) -> Result<Outcome, CartError> {
        info!(lines = self.len(), "order submitted, clearing cart");

        self.clear()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{lines::tests::phone, storage::MemoryStore};

    use super::*;

    fn customer() -> CustomerDetails {
        CustomerDetails {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "01700000000".to_string(),
            address: "12 Analytical Row".to_string(),
        }
    }

    #[test]
    fn empty_cart_cannot_be_ordered() {
        let (cart, _) = Cart::new(MemoryStore::new());

        assert_eq!(
            cart.order_payload(customer()),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn blank_fields_are_reported() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_one(phone("A", Decimal::from(100)))?;

        let mut details = customer();
        details.address = "  ".to_string();

        assert_eq!(
            cart.order_payload(details),
            Err(CheckoutError::MissingField("address"))
        );

        Ok(())
    }

    #[test]
    fn payload_carries_discounted_total_and_items() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());

        let mut product = phone("A", Decimal::from(100));
        product.catalog_id = Some("17".to_string());

        cart.add_item(product, 2)?;
        cart.add_one(phone("B", Decimal::from(50)))?;

        let payload = cart.order_payload(customer())?;

        assert_eq!(payload.total_price, Decimal::from(240));
        assert_eq!(
            payload.items,
            [
                OrderItem {
                    phone_id: Some("17".to_string()),
                    model_name: "A".to_string(),
                    quantity: 2,
                },
                OrderItem {
                    phone_id: None,
                    model_name: "B".to_string(),
                    quantity: 1,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn payload_serialises_flat_customer_fields() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_one(phone("A", Decimal::from(100)))?;

        let json = serde_json::to_value(cart.order_payload(customer())?)?;

        assert_eq!(json["full_name"], "Ada Lovelace");
        assert_eq!(json["total_price"], "100");
        assert_eq!(json["items"][0]["model_name"], "A");

        Ok(())
    }

    #[test]
    fn building_a_payload_does_not_clear_the_cart() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_one(phone("A", Decimal::from(100)))?;

        cart.order_payload(customer())?;

        assert_eq!(cart.len(), 1);

        cart.order_submitted()?;

        assert!(cart.is_empty());
        assert!(cart.slot().load().lines.is_empty());

        Ok(())
    }

    #[test]
    fn payment_amount_has_two_decimals() -> TestResult {
        let (mut cart, _) = Cart::new(MemoryStore::new());
        cart.add_item(phone("A", Decimal::new(3333, 2)), 3)?;

        // 99.99 less 4% is 95.9904
        let request = cart.payment_request("01700000000", "REF1", "INV1");

        assert_eq!(request.amount, "95.99");
        assert_eq!(request.reference_id, "REF1");
        assert_eq!(request.invoice_id, "INV1");

        Ok(())
    }

    #[test]
    fn format_amount_pads_and_rounds() {
        assert_eq!(format_amount(Decimal::from(198)), "198.00");
        assert_eq!(format_amount(Decimal::new(5, 3)), "0.01");
        assert_eq!(format_amount(Decimal::new(12_344, 4)), "1.23");
    }
}
