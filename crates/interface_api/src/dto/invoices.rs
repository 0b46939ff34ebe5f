//! Invoice DTOs
//!
//! Request bodies are validated with `validator` before they reach the
//! domain; the domain still re-checks every line item, so these checks only
//! produce friendlier, field-addressed errors.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{format_indian, Money, ProductId};
use domain_invoicing::{
    AdvanceInput, CustomerInfo, Invoice, InvoiceDraft, InvoicePreview, InvoiceQuery, InvoiceStatus,
    InvoiceTotals, InvoicingError, LineBreakdown, LineItem, PaymentUpdate, ShippingInfo,
};

fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > dec!(100) {
        return Err(ValidationError::new("percentage").with_message("must be between 0 and 100".into()));
    }
    Ok(())
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    Ok(())
}

fn validate_advance(request: &CreateInvoiceRequest) -> Result<(), ValidationError> {
    if request.advance_percent.is_some() && request.advance_amount.is_some() {
        return Err(ValidationError::new("advance")
            .with_message("give either advance_percent or advance_amount, not both".into()));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn parse_status(status: Option<&str>) -> Result<Option<InvoiceStatus>, InvoicingError> {
    status.map(str::parse).transpose()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub name: String,
    #[validate(length(min = 7, max = 20, message = "Phone number must be 7 to 20 characters"))]
    pub phone_number: String,
    pub address: Option<String>,
    #[validate(length(equal = 15, message = "GSTIN must be 15 characters"))]
    pub gstin: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShippingRequest {
    #[validate(length(min = 1, message = "Shipping name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Shipping address is required"))]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItemRequest {
    pub product_id: i64,
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    pub hsn: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub unit_price: Decimal,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    #[serde(default)]
    #[validate(custom(function = "validate_percentage"))]
    pub discount_percent: Decimal,
}

impl LineItemRequest {
    fn to_line_item(&self) -> LineItem {
        LineItem {
            product_id: ProductId::new(self.product_id),
            name: self.name.clone(),
            hsn: self.hsn.clone(),
            unit: self.unit.clone(),
            description: self.description.clone(),
            unit_price: Money::inr(self.unit_price),
            quantity: self.quantity,
            discount_percent: self.discount_percent,
        }
    }
}

/// Body for previewing or creating an invoice
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_advance"))]
pub struct CreateInvoiceRequest {
    #[validate(nested)]
    pub customer: CustomerRequest,
    #[validate(nested)]
    pub shipping: Option<ShippingRequest>,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<LineItemRequest>,
    #[serde(default = "default_true")]
    pub include_tax: bool,
    /// Invoice-level discount for items without their own
    #[validate(custom(function = "validate_percentage"))]
    pub discount_percent: Option<Decimal>,
    #[validate(custom(function = "validate_percentage"))]
    pub advance_percent: Option<Decimal>,
    #[validate(custom(function = "validate_non_negative"))]
    pub advance_amount: Option<Decimal>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl CreateInvoiceRequest {
    /// Converts the validated body into a domain draft
    pub fn to_draft(&self) -> Result<InvoiceDraft, InvoicingError> {
        let customer = CustomerInfo {
            name: self.customer.name.trim().to_string(),
            phone_number: self.customer.phone_number.trim().to_string(),
            address: self.customer.address.clone(),
            gstin: self.customer.gstin.clone(),
        };
        let items = self.items.iter().map(LineItemRequest::to_line_item).collect();

        let mut draft = InvoiceDraft::new(customer, self.invoice_date, items).with_tax(self.include_tax);
        if let Some(due_date) = self.due_date {
            draft = draft.with_due_date(due_date);
        }
        if let Some(delivery_date) = self.delivery_date {
            draft = draft.with_delivery_date(delivery_date);
        }
        if let Some(shipping) = &self.shipping {
            draft = draft.with_shipping(ShippingInfo {
                name: shipping.name.clone(),
                address: shipping.address.clone(),
            });
        }
        if let Some(discount) = self.discount_percent {
            draft = draft.with_invoice_discount(discount);
        }
        draft = match (self.advance_percent, self.advance_amount) {
            (_, Some(amount)) => draft.with_advance(AdvanceInput::Amount(amount)),
            (Some(percent), None) => draft.with_advance(AdvanceInput::Percent(percent)),
            (None, None) => draft,
        };
        if let Some(status) = parse_status(self.status.as_deref())? {
            draft = draft.with_status(status);
        }
        if let Some(notes) = &self.notes {
            draft = draft.with_notes(notes.clone());
        }
        Ok(draft)
    }
}

/// Body for recording a payment against an invoice
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentRequest {
    /// Total advance received so far
    #[validate(custom(function = "validate_non_negative"))]
    pub advance_paid: Option<Decimal>,
    pub status: Option<String>,
}

impl PaymentRequest {
    pub fn to_update(&self) -> Result<PaymentUpdate, InvoicingError> {
        Ok(PaymentUpdate {
            status: parse_status(self.status.as_deref())?,
            advance_paid: self.advance_paid,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListInvoicesQuery {
    pub fn to_query(&self) -> Result<InvoiceQuery, InvoicingError> {
        let mut query = InvoiceQuery {
            status: parse_status(self.status.as_deref())?,
            ..Default::default()
        };
        if let Some(search) = &self.search {
            query = query.search(search.clone());
        }
        query.limit = self.limit;
        query.offset = self.offset;
        Ok(query)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NextNumberQuery {
    #[validate(range(min = 2000, max = 9999))]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmountInWordsQuery {
    pub amount: Decimal,
}

// ============================================================================
// Responses
// ============================================================================

/// Amounts rounded to paise for display
#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub currency: String,
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub grand_total: Decimal,
    pub advance_amount: Decimal,
    pub balance_due: Decimal,
    /// Grand total with Indian digit grouping, e.g. `12,34,567.89`
    pub grand_total_formatted: String,
}

impl From<&InvoiceTotals> for TotalsResponse {
    fn from(totals: &InvoiceTotals) -> Self {
        let rounded = totals.rounded();
        Self {
            currency: rounded.grand_total.currency().code().to_string(),
            subtotal: rounded.subtotal.amount(),
            total_discount: rounded.total_discount.amount(),
            cgst: rounded.cgst.amount(),
            sgst: rounded.sgst.amount(),
            grand_total: rounded.grand_total.amount(),
            advance_amount: rounded.advance_amount.amount(),
            balance_due: rounded.balance_due.amount(),
            grand_total_formatted: format_indian(rounded.grand_total.amount(), 2),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineBreakdownResponse {
    pub line_total: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total: Decimal,
}

impl From<&LineBreakdown> for LineBreakdownResponse {
    fn from(line: &LineBreakdown) -> Self {
        Self {
            line_total: line.line_total.round_to_currency().amount(),
            cgst: line.cgst.round_to_currency().amount(),
            sgst: line.sgst.round_to_currency().amount(),
            total: line.total.round_to_currency().amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub totals: TotalsResponse,
    pub lines: Vec<LineBreakdownResponse>,
    pub total_in_words: String,
}

impl From<&InvoicePreview> for PreviewResponse {
    fn from(preview: &InvoicePreview) -> Self {
        Self {
            totals: TotalsResponse::from(&preview.totals),
            lines: preview.lines.iter().map(LineBreakdownResponse::from).collect(),
            total_in_words: preview.total_in_words.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub product_id: i64,
    pub name: String,
    pub hsn: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub discount_percent: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: i64,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub customer: CustomerInfo,
    pub shipping: Option<ShippingInfo>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub include_tax: bool,
    pub items: Vec<LineItemResponse>,
    pub totals: TotalsResponse,
    pub total_in_words: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Invoice> for InvoiceResponse {
    type Error = InvoicingError;

    fn try_from(invoice: &Invoice) -> Result<Self, Self::Error> {
        let items = invoice
            .items
            .iter()
            .map(|item| {
                Ok(LineItemResponse {
                    product_id: item.product_id.value(),
                    name: item.name.clone(),
                    hsn: item.hsn.clone(),
                    unit: item.unit.clone(),
                    description: item.description.clone(),
                    unit_price: item.unit_price.amount(),
                    quantity: item.quantity,
                    discount_percent: item.discount_percent,
                    line_total: item.line_total()?.round_to_currency().amount(),
                })
            })
            .collect::<Result<Vec<_>, InvoicingError>>()?;

        Ok(Self {
            id: invoice.id.value(),
            invoice_number: invoice.invoice_number.to_string(),
            status: invoice.status,
            customer: invoice.customer.clone(),
            shipping: invoice.shipping.clone(),
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            delivery_date: invoice.delivery_date,
            include_tax: invoice.include_tax,
            items,
            totals: TotalsResponse::from(&invoice.totals),
            total_in_words: invoice.total_in_words.clone(),
            notes: invoice.notes.clone(),
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NextNumberResponse {
    pub year: i32,
    pub invoice_number: String,
}

#[derive(Debug, Serialize)]
pub struct AmountInWordsResponse {
    pub amount: Decimal,
    pub words: String,
    /// The printed form, ending in "Only"
    pub line: String,
}
