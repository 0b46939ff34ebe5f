//! Monetary calculator
//!
//! Derives subtotal, discount, CGST/SGST, grand total, advance, and balance
//! from a list of line items. Amounts keep full precision; call
//! [`InvoiceTotals::rounded`] only when preparing values for display.
//!
//! GST is a flat 6% CGST plus 6% SGST on the discounted subtotal. There is
//! no per-category slab.

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InvoicingError;
use crate::line_item::{is_percentage, LineItem};

/// Central GST rate
pub const CGST_RATE: Rate = Rate::new(dec!(0.06));

/// State GST rate
pub const SGST_RATE: Rate = Rate::new(dec!(0.06));

/// How the advance payment is expressed
///
/// `Percent` is used when previewing a document, `Amount` when recording a
/// partial payment against an issued invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum AdvanceInput {
    /// Percentage of the grand total, in [0, 100]
    Percent(Decimal),
    /// Fixed amount, not negative
    Amount(Decimal),
}

impl Default for AdvanceInput {
    fn default() -> Self {
        AdvanceInput::Percent(Decimal::ZERO)
    }
}

impl AdvanceInput {
    /// Checks the value against the mode's bounds
    pub fn validate(&self) -> Result<(), InvoicingError> {
        match *self {
            AdvanceInput::Percent(value) if !is_percentage(value) => Err(
                InvoicingError::InvalidAdvance(format!("percentage must be within 0..=100, got {value}")),
            ),
            AdvanceInput::Amount(value) if value.is_sign_negative() && !value.is_zero() => Err(
                InvoicingError::InvalidAdvance(format!("amount must not be negative, got {value}")),
            ),
            _ => Ok(()),
        }
    }

    /// Resolves the advance against a grand total
    pub fn resolve(&self, grand_total: Money) -> Result<Money, MoneyError> {
        match *self {
            AdvanceInput::Percent(value) => Rate::from_percentage(value).apply(&grand_total),
            AdvanceInput::Amount(value) => Ok(Money::new(value, grand_total.currency())),
        }
    }
}

/// Derived invoice amounts
///
/// `balance_due` may be negative when the advance exceeds the grand total;
/// the calculator does not clamp it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub total_discount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub grand_total: Money,
    pub advance_amount: Money,
    pub balance_due: Money,
}

impl InvoiceTotals {
    /// All-zero totals in the given currency
    pub fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            subtotal: zero,
            total_discount: zero,
            cgst: zero,
            sgst: zero,
            grand_total: zero,
            advance_amount: zero,
            balance_due: zero,
        }
    }

    /// CGST plus SGST
    pub fn gst_total(&self) -> Result<Money, MoneyError> {
        self.cgst.checked_add(&self.sgst)
    }

    /// Returns true when any tax was charged
    pub fn includes_tax(&self) -> bool {
        !(self.cgst.is_zero() && self.sgst.is_zero())
    }

    /// Re-derives advance and balance from a new advance input
    pub fn with_advance(&self, advance: AdvanceInput) -> Result<Self, InvoicingError> {
        advance.validate()?;
        let advance_amount = advance.resolve(self.grand_total)?;
        let balance_due = self.grand_total.checked_sub(&advance_amount)?;
        Ok(Self {
            advance_amount,
            balance_due,
            ..*self
        })
    }

    /// Zeroes the advance and the balance
    ///
    /// This is the PAID override: it replaces the arithmetic result rather
    /// than following from it.
    pub fn settled(&self) -> Self {
        let zero = Money::zero(self.grand_total.currency());
        Self {
            advance_amount: zero,
            balance_due: zero,
            ..*self
        }
    }

    /// Copy with every amount rounded half-up to the currency's places
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: self.subtotal.round_to_currency(),
            total_discount: self.total_discount.round_to_currency(),
            cgst: self.cgst.round_to_currency(),
            sgst: self.sgst.round_to_currency(),
            grand_total: self.grand_total.round_to_currency(),
            advance_amount: self.advance_amount.round_to_currency(),
            balance_due: self.balance_due.round_to_currency(),
        }
    }
}

/// Per-line tax breakdown as shown in the invoice preview table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreakdown {
    pub line_total: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub total: Money,
}

/// Computes invoice totals from line items
///
/// # Errors
///
/// * `InvalidLineItem` if any item has `quantity < 1`, a negative unit price,
///   or a discount outside `0..=100`; no partial result is returned
/// * `InvalidAdvance` if the advance input is out of range
/// * `Calculation` if items mix currencies or an amount overflows
pub fn compute_totals(
    items: &[LineItem],
    include_tax: bool,
    advance: AdvanceInput,
) -> Result<InvoiceTotals, InvoicingError> {
    compute_totals_with_invoice_discount(items, None, include_tax, advance)
}

/// Computes invoice totals, applying an invoice-level discount
///
/// The invoice-level percentage is applied to every line that carries no
/// discount of its own, before summation. Lines with their own discount keep
/// it unchanged; see [`apply_invoice_discount`].
pub fn compute_totals_with_invoice_discount(
    items: &[LineItem],
    invoice_discount: Option<Decimal>,
    include_tax: bool,
    advance: AdvanceInput,
) -> Result<InvoiceTotals, InvoicingError> {
    advance.validate()?;
    let items = apply_invoice_discount(items, invoice_discount)?;

    let currency = items
        .first()
        .map(|item| item.unit_price.currency())
        .unwrap_or_default();
    let mut subtotal = Money::zero(currency);
    let mut total_discount = Money::zero(currency);

    for (index, item) in items.iter().enumerate() {
        item.validate(index)?;
        subtotal = subtotal.checked_add(&item.line_total()?)?;
        total_discount = total_discount.checked_add(&item.discount_amount()?)?;
    }

    let (cgst, sgst) = gst_for(subtotal, include_tax)?;
    let grand_total = subtotal.checked_add(&cgst)?.checked_add(&sgst)?;
    let advance_amount = advance.resolve(grand_total)?;
    let balance_due = grand_total.checked_sub(&advance_amount)?;

    debug!(
        items = items.len(),
        subtotal = %subtotal.amount(),
        grand_total = %grand_total.amount(),
        include_tax,
        "Computed invoice totals"
    );

    Ok(InvoiceTotals {
        subtotal,
        total_discount,
        cgst,
        sgst,
        grand_total,
        advance_amount,
        balance_due,
    })
}

/// Copies `items` with the invoice-level discount set on every line that
/// has no discount of its own
///
/// The result is what gets totalled, broken down per line, and stored, so
/// all three agree.
///
/// # Errors
///
/// `InvalidDiscount` if the percentage lies outside `0..=100`.
pub fn apply_invoice_discount(
    items: &[LineItem],
    invoice_discount: Option<Decimal>,
) -> Result<Vec<LineItem>, InvoicingError> {
    let discount = match invoice_discount {
        Some(discount) if !is_percentage(discount) => {
            return Err(InvoicingError::InvalidDiscount(format!(
                "invoice discount must be within 0..=100, got {discount}"
            )));
        }
        Some(discount) if !discount.is_zero() => discount,
        _ => return Ok(items.to_vec()),
    };

    Ok(items
        .iter()
        .map(|item| {
            if item.has_discount() {
                item.clone()
            } else {
                item.clone().with_discount(discount)
            }
        })
        .collect())
}

/// Computes the per-line tax breakdown
///
/// Expects items that already carry any invoice-level discount.
pub fn line_breakdowns(
    items: &[LineItem],
    include_tax: bool,
) -> Result<Vec<LineBreakdown>, InvoicingError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.validate(index)?;
            let line_total = item.line_total()?;
            let (cgst, sgst) = gst_for(line_total, include_tax)?;
            Ok(LineBreakdown {
                line_total,
                cgst,
                sgst,
                total: line_total.checked_add(&cgst)?.checked_add(&sgst)?,
            })
        })
        .collect()
}

fn gst_for(taxable: Money, include_tax: bool) -> Result<(Money, Money), MoneyError> {
    if include_tax {
        Ok((CGST_RATE.apply(&taxable)?, SGST_RATE.apply(&taxable)?))
    } else {
        let zero = Money::zero(taxable.currency());
        Ok((zero, zero))
    }
}
