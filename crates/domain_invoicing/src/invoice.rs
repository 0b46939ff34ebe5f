//! Invoice aggregate
//!
//! An [`InvoiceDraft`] holds the raw order data a caller submits. Computing
//! it yields an [`InvoicePreview`]; pairing the draft with an allocated
//! number yields a [`NewInvoice`] ready for persistence, and the store hands
//! back an [`Invoice`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::InvoiceId;

use crate::error::InvoicingError;
use crate::line_item::LineItem;
use crate::numbering::{invoice_year, InvoiceNumber};
use crate::totals::{
    apply_invoice_discount, compute_totals, line_breakdowns, AdvanceInput, InvoiceTotals, LineBreakdown,
};
use crate::words::amount_in_words_line;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Saved but not yet issued
    Draft,
    /// Issued to the customer
    Final,
    /// Issued, awaiting payment
    Pending,
    /// Past the due date
    Overdue,
    /// Fully settled
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Final => "FINAL",
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Paid => "PAID",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = InvoicingError;

    /// Parses a status case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "FINAL" => Ok(InvoiceStatus::Final),
            "PENDING" => Ok(InvoiceStatus::Pending),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            "PAID" => Ok(InvoiceStatus::Paid),
            _ => Err(InvoicingError::InvalidStatus(s.to_string())),
        }
    }
}

/// Applies the status-driven business rule to computed totals
///
/// Marking an invoice PAID zeroes the recorded advance and the balance
/// regardless of the arithmetic. Every other status leaves the totals as
/// computed.
pub fn apply_status_override(totals: &InvoiceTotals, status: InvoiceStatus) -> InvoiceTotals {
    if status.is_paid() {
        totals.settled()
    } else {
        *totals
    }
}

/// Billing customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    /// Phone number; customers are matched on it when an invoice is saved
    pub phone_number: String,
    pub address: Option<String>,
    pub gstin: Option<String>,
}

impl CustomerInfo {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            address: None,
            gstin: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Delivery address when it differs from the billing customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub address: String,
}

/// Computed amounts for a draft, before any number is allocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePreview {
    /// Lines as billed, with the invoice-level discount applied
    pub items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub lines: Vec<LineBreakdown>,
    pub total_in_words: String,
}

/// Raw order data submitted for an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub customer: CustomerInfo,
    pub shipping: Option<ShippingInfo>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub include_tax: bool,
    pub invoice_discount: Option<Decimal>,
    pub advance: AdvanceInput,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

impl InvoiceDraft {
    /// Creates a taxed draft due on the invoice date with no advance
    pub fn new(customer: CustomerInfo, invoice_date: NaiveDate, items: Vec<LineItem>) -> Self {
        Self {
            customer,
            shipping: None,
            invoice_date,
            due_date: invoice_date,
            delivery_date: None,
            items,
            include_tax: true,
            invoice_discount: None,
            advance: AdvanceInput::default(),
            status: InvoiceStatus::Draft,
            notes: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_delivery_date(mut self, delivery_date: NaiveDate) -> Self {
        self.delivery_date = Some(delivery_date);
        self
    }

    pub fn with_shipping(mut self, shipping: ShippingInfo) -> Self {
        self.shipping = Some(shipping);
        self
    }

    pub fn with_tax(mut self, include_tax: bool) -> Self {
        self.include_tax = include_tax;
        self
    }

    pub fn with_invoice_discount(mut self, discount_percent: Decimal) -> Self {
        self.invoice_discount = Some(discount_percent);
        self
    }

    pub fn with_advance(mut self, advance: AdvanceInput) -> Self {
        self.advance = advance;
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

    /// The year whose sequence this invoice is numbered in
    pub fn numbering_year(&self) -> i32 {
        invoice_year(self.invoice_date)
    }

    /// Computes totals, per-line breakdown, and the amount in words
    pub fn compute(&self) -> Result<InvoicePreview, InvoicingError> {
        let items = apply_invoice_discount(&self.items, self.invoice_discount)?;
        let totals = compute_totals(&items, self.include_tax, self.advance)?;
        let totals = apply_status_override(&totals, self.status);
        let lines = line_breakdowns(&items, self.include_tax)?;
        let total_in_words = amount_in_words_line(totals.grand_total.round_to_currency().amount());

        Ok(InvoicePreview {
            items,
            totals,
            lines,
            total_in_words,
        })
    }

    /// Pairs the draft with an allocated number
    pub fn to_new_invoice(&self, invoice_number: InvoiceNumber, preview: &InvoicePreview) -> NewInvoice {
        NewInvoice {
            invoice_number,
            customer: self.customer.clone(),
            shipping: self.shipping.clone(),
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            delivery_date: self.delivery_date,
            items: preview.items.clone(),
            include_tax: self.include_tax,
            totals: preview.totals,
            total_in_words: preview.total_in_words.clone(),
            status: self.status,
            notes: self.notes.clone(),
        }
    }
}

/// A numbered invoice that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: InvoiceNumber,
    pub customer: CustomerInfo,
    pub shipping: Option<ShippingInfo>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub include_tax: bool,
    pub totals: InvoiceTotals,
    pub total_in_words: String,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

/// Changes recorded against an issued invoice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    /// New status, if changing
    pub status: Option<InvoiceStatus>,
    /// Total advance received so far, as a fixed amount
    pub advance_paid: Option<Decimal>,
}

/// A persisted invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: InvoiceNumber,
    pub customer: CustomerInfo,
    pub shipping: Option<ShippingInfo>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub include_tax: bool,
    pub totals: InvoiceTotals,
    pub total_in_words: String,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Builds the persisted form from a new invoice and its assigned key
    pub fn from_new(id: InvoiceId, new: NewInvoice, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            invoice_number: new.invoice_number,
            customer: new.customer,
            shipping: new.shipping,
            invoice_date: new.invoice_date,
            due_date: new.due_date,
            delivery_date: new.delivery_date,
            items: new.items,
            include_tax: new.include_tax,
            totals: new.totals,
            total_in_words: new.total_in_words,
            status: new.status,
            notes: new.notes,
            created_at,
            updated_at: created_at,
        }
    }

    /// Records a fixed-amount advance and/or a status change
    ///
    /// The advance is applied first; the PAID override runs last so it wins
    /// over any arithmetic. Leaving PAID for another status re-derives the
    /// balance from the grand total and the recorded advance.
    pub fn apply_payment(&mut self, update: &PaymentUpdate) -> Result<(), InvoicingError> {
        let status = update.status.unwrap_or(self.status);
        let advance = update
            .advance_paid
            .unwrap_or_else(|| self.totals.advance_amount.amount());

        let totals = self.totals.with_advance(AdvanceInput::Amount(advance))?;
        self.totals = apply_status_override(&totals, status);
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remaining amount owed
    pub fn balance_due(&self) -> Decimal {
        self.totals.balance_due.amount()
    }
}
