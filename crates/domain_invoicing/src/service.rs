//! Invoice domain service
//!
//! Orchestrates the pure calculator and allocator with the store port.
//! Allocation and creation run as one unit: when the store rejects a
//! number as a duplicate (another writer got there first), the service
//! looks the latest number up again and retries.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::InvoiceId;

use crate::error::InvoicingError;
use crate::invoice::{Invoice, InvoiceDraft, InvoicePreview, PaymentUpdate};
use crate::numbering::{next_after, year_prefix, InvoiceNumber};
use crate::ports::{InvoiceQuery, InvoiceStorePort};

/// Allocation attempts before giving up with `AllocationConflict`
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Service issuing and updating invoices through an [`InvoiceStorePort`]
#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStorePort>,
    max_attempts: u32,
}

impl InvoiceService {
    /// Creates a service with the default retry budget
    pub fn new(store: Arc<dyn InvoiceStorePort>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the number of allocation attempts (at least one)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Computes a draft without allocating a number or persisting anything
    pub fn preview(&self, draft: &InvoiceDraft) -> Result<InvoicePreview, InvoicingError> {
        draft.compute()
    }

    /// Returns the number the next invoice of `year` would receive
    ///
    /// Nothing is reserved; a concurrent writer may take it first.
    pub async fn next_number(&self, year: i32) -> Result<InvoiceNumber, InvoicingError> {
        let latest = self.store.latest_invoice_number(&year_prefix(year)).await?;
        next_after(year, latest.as_ref().map(InvoiceNumber::as_str))
    }

    /// Validates, computes, numbers, and persists a draft
    ///
    /// # Errors
    ///
    /// * `InvalidLineItem` / `InvalidAdvance` / `InvalidDiscount` before any
    ///   number is allocated
    /// * `MalformedSequence` if the latest stored number cannot be parsed
    /// * `AllocationConflict` once every attempt hit a duplicate number
    #[instrument(skip_all, fields(customer = %draft.customer.name, items = draft.items.len()))]
    pub async fn issue(&self, draft: &InvoiceDraft) -> Result<Invoice, InvoicingError> {
        let preview = draft.compute()?;
        let year = draft.numbering_year();
        let mut last_number = None;

        for attempt in 1..=self.max_attempts {
            let number = self.next_number(year).await?;
            let new_invoice = draft.to_new_invoice(number.clone(), &preview);

            match self.store.create_invoice(&new_invoice).await {
                Ok(invoice) => {
                    info!(
                        invoice_number = %invoice.invoice_number,
                        invoice_id = %invoice.id,
                        attempt,
                        "Invoice issued"
                    );
                    return Ok(invoice);
                }
                Err(error) if error.is_conflict() => {
                    warn!(invoice_number = %number, attempt, "Invoice number already taken, retrying allocation");
                    last_number = Some(number);
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(InvoicingError::AllocationConflict {
            attempts: self.max_attempts,
            last_number: last_number.map(String::from).unwrap_or_default(),
        })
    }

    /// Finds an invoice by key
    pub async fn get(&self, id: InvoiceId) -> Result<Invoice, InvoicingError> {
        Ok(self.store.find_invoice(id).await?)
    }

    /// Lists invoices matching a query
    pub async fn list(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, InvoicingError> {
        Ok(self.store.list_invoices(query).await?)
    }

    /// Records an advance and/or status change against an issued invoice
    #[instrument(skip(self, update), fields(invoice_id = %id))]
    pub async fn record_payment(&self, id: InvoiceId, update: &PaymentUpdate) -> Result<Invoice, InvoicingError> {
        let mut invoice = self.store.find_invoice(id).await?;
        invoice.apply_payment(update)?;
        let saved = self.store.update_invoice(&invoice).await?;

        info!(
            invoice_number = %saved.invoice_number,
            status = %saved.status,
            balance_due = %saved.balance_due(),
            "Invoice payment recorded"
        );
        Ok(saved)
    }
}
