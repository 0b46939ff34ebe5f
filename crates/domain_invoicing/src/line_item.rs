//! Invoice line items
//!
//! A line item is never persisted on its own; its derived amounts are
//! recomputed from unit price, quantity, and discount whenever needed.

use core_kernel::{Money, MoneyError, ProductId, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InvoicingError;

/// A product line on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalogue product
    pub product_id: ProductId,
    /// Product name as printed
    pub name: String,
    /// HSN code for GST filings
    pub hsn: Option<String>,
    /// Unit of measure (pcs, set, ...)
    pub unit: Option<String>,
    /// Free text shown under the product name
    pub description: Option<String>,
    /// Price per unit before discount
    pub unit_price: Money,
    /// Number of units, at least 1
    pub quantity: i64,
    /// Discount percentage in [0, 100]
    #[serde(default)]
    pub discount_percent: Decimal,
}

impl LineItem {
    /// Creates a line item with no discount
    pub fn new(product_id: ProductId, name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        Self {
            product_id,
            name: name.into(),
            hsn: None,
            unit: None,
            description: None,
            unit_price,
            quantity,
            discount_percent: Decimal::ZERO,
        }
    }

    /// Sets the discount percentage
    pub fn with_discount(mut self, discount_percent: Decimal) -> Self {
        self.discount_percent = discount_percent;
        self
    }

    /// Sets the HSN code
    pub fn with_hsn(mut self, hsn: impl Into<String>) -> Self {
        self.hsn = Some(hsn.into());
        self
    }

    /// Sets the unit of measure
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks quantity, price, and discount bounds
    ///
    /// `index` is the item's position in the invoice and is carried into
    /// the error so callers can point at the offending row.
    pub fn validate(&self, index: usize) -> Result<(), InvoicingError> {
        if self.quantity < 1 {
            return Err(InvoicingError::invalid_line_item(
                index,
                format!("quantity must be at least 1, got {}", self.quantity),
            ));
        }
        if self.unit_price.is_negative() {
            return Err(InvoicingError::invalid_line_item(
                index,
                format!("unit price must not be negative, got {}", self.unit_price.amount()),
            ));
        }
        if !is_percentage(self.discount_percent) {
            return Err(InvoicingError::invalid_line_item(
                index,
                format!("discount must be within 0..=100, got {}", self.discount_percent),
            ));
        }
        Ok(())
    }

    /// Returns true when the item carries its own discount
    pub fn has_discount(&self) -> bool {
        !self.discount_percent.is_zero()
    }

    /// `unit_price × (1 − discount_percent/100)`
    pub fn discounted_unit_price(&self) -> Result<Money, MoneyError> {
        let discount = Rate::from_percentage(self.discount_percent);
        self.unit_price.multiply(discount.complement())
    }

    /// `unit_price × quantity`, before discount
    pub fn gross_total(&self) -> Result<Money, MoneyError> {
        self.unit_price.multiply(Decimal::from(self.quantity))
    }

    /// `discounted_unit_price × quantity`
    ///
    /// Fails with `InvalidAmount` when the product overflows a `Decimal`.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.discounted_unit_price()?.multiply(Decimal::from(self.quantity))
    }

    /// Amount taken off by the discount
    pub fn discount_amount(&self) -> Result<Money, MoneyError> {
        self.gross_total()?.checked_sub(&self.line_total()?)
    }
}

/// Returns true when `value` lies within `0..=100`
pub(crate) fn is_percentage(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= dec!(100)
}
