//! Invoicing Domain - Invoice Computation & Numbering
//!
//! This crate holds the parts of the invoicing system with real invariants:
//!
//! - **Monetary calculator** ([`totals`]): per-line discount, flat 6% CGST and
//!   6% SGST, grand total, advance, and balance due
//! - **Sequence allocator** ([`numbering`]): `{year}/{yy}-INV-{seq:04}`
//!   numbers derived from the latest stored number of the year
//! - **Amount-in-words formatter** ([`words`]): Indian numbering (lakh/crore)
//!   with paise
//!
//! The three are pure. [`service::InvoiceService`] wires them to a
//! persistence port and retries allocation when the store reports a
//! duplicate number.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoicing::{compute_totals, next_invoice_number, to_words, AdvanceInput};
//!
//! let totals = compute_totals(&items, true, AdvanceInput::Percent(dec!(50)))?;
//! let number = next_invoice_number(2024, |prefix| store.latest(prefix))?;
//! let words = to_words(totals.grand_total.round_to_currency().amount());
//! ```

pub mod error;
pub mod line_item;
pub mod totals;
pub mod numbering;
pub mod words;
pub mod invoice;
pub mod ports;
pub mod service;

pub use error::InvoicingError;
pub use line_item::LineItem;
pub use totals::{
    apply_invoice_discount, compute_totals, compute_totals_with_invoice_discount, line_breakdowns, AdvanceInput,
    InvoiceTotals, LineBreakdown, CGST_RATE, SGST_RATE,
};
pub use numbering::{next_after, next_invoice_number, trailing_sequence, year_prefix, InvoiceNumber};
pub use words::{amount_in_words_line, to_words};
pub use invoice::{
    apply_status_override, CustomerInfo, Invoice, InvoiceDraft, InvoicePreview, InvoiceStatus,
    NewInvoice, PaymentUpdate, ShippingInfo,
};
pub use ports::{InvoiceQuery, InvoiceStorePort};
pub use service::{InvoiceService, DEFAULT_MAX_ATTEMPTS};
