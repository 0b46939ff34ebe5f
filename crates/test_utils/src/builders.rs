//! Test Data Builders
//!
//! Builders for drafts and line items with sensible defaults, so tests only
//! spell out the fields they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Money, ProductId};
use domain_invoicing::{
    AdvanceInput, CustomerInfo, InvoiceDraft, InvoiceStatus, LineItem, ShippingInfo,
};

use crate::fixtures::{CustomerFixtures, DateFixtures, ItemFixtures};

/// Builder for line items
pub struct LineItemBuilder {
    product_id: ProductId,
    name: String,
    unit_price: Money,
    quantity: i64,
    discount_percent: Decimal,
    hsn: Option<String>,
}

impl Default for LineItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemBuilder {
    /// One unit at 1,000.00 with no discount
    pub fn new() -> Self {
        Self {
            product_id: ProductId::new(1),
            name: "Madhubani Painting".to_string(),
            unit_price: Money::inr(dec!(1000.00)),
            quantity: 1,
            discount_percent: Decimal::ZERO,
            hsn: None,
        }
    }

    pub fn with_product_id(mut self, id: i64) -> Self {
        self.product_id = ProductId::new(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the unit price in rupees
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.unit_price = Money::inr(price);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.discount_percent = percent;
        self
    }

    pub fn with_hsn(mut self, hsn: impl Into<String>) -> Self {
        self.hsn = Some(hsn.into());
        self
    }

    pub fn build(self) -> LineItem {
        let mut item = LineItem::new(self.product_id, self.name, self.unit_price, self.quantity)
            .with_discount(self.discount_percent);
        item.hsn = self.hsn;
        item
    }
}

/// Builder for invoice drafts
pub struct InvoiceDraftBuilder {
    customer: CustomerInfo,
    shipping: Option<ShippingInfo>,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    items: Vec<LineItem>,
    include_tax: bool,
    invoice_discount: Option<Decimal>,
    advance: AdvanceInput,
    status: InvoiceStatus,
    notes: Option<String>,
}

impl Default for InvoiceDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceDraftBuilder {
    /// A taxed walk-in order for the standard items, dated June 1, 2024
    pub fn new() -> Self {
        Self {
            customer: CustomerFixtures::walk_in(),
            shipping: None,
            invoice_date: DateFixtures::invoice_date(),
            due_date: DateFixtures::due_date(),
            items: ItemFixtures::standard_order(),
            include_tax: true,
            invoice_discount: None,
            advance: AdvanceInput::default(),
            status: InvoiceStatus::Draft,
            notes: None,
        }
    }

    pub fn with_customer(mut self, customer: CustomerInfo) -> Self {
        self.customer = customer;
        self
    }

    pub fn with_shipping(mut self, shipping: ShippingInfo) -> Self {
        self.shipping = Some(shipping);
        self
    }

    /// Sets the invoice date; the due date moves with it when it would
    /// otherwise fall earlier
    pub fn on(mut self, invoice_date: NaiveDate) -> Self {
        self.invoice_date = invoice_date;
        if self.due_date < invoice_date {
            self.due_date = invoice_date;
        }
        self
    }

    /// Dates the invoice January 1 of `year`
    pub fn in_year(self, year: i32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid year");
        self.on(date)
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Replaces all items
    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    pub fn add_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn without_tax(mut self) -> Self {
        self.include_tax = false;
        self
    }

    pub fn with_invoice_discount(mut self, percent: Decimal) -> Self {
        self.invoice_discount = Some(percent);
        self
    }

    pub fn with_advance_percent(mut self, percent: Decimal) -> Self {
        self.advance = AdvanceInput::Percent(percent);
        self
    }

    pub fn with_advance_amount(mut self, amount: Decimal) -> Self {
        self.advance = AdvanceInput::Amount(amount);
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(self.customer, self.invoice_date, self.items)
            .with_due_date(self.due_date)
            .with_tax(self.include_tax)
            .with_advance(self.advance)
            .with_status(self.status);
        draft.shipping = self.shipping;
        draft.invoice_discount = self.invoice_discount;
        draft.notes = self.notes;
        draft
    }
}
